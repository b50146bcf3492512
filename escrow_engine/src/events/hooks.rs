use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, TransferVerifiedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub transfer_verified_producer: Vec<EventProducer<TransferVerifiedEvent>>,
}

pub struct EventHandlers {
    pub on_transfer_verified: Option<EventHandler<TransferVerifiedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_transfer_verified = hooks.on_transfer_verified.map(|f| EventHandler::new(buffer_size, f));
        Self { on_transfer_verified }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_transfer_verified {
            result.transfer_verified_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_transfer_verified {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_transfer_verified: Option<Handler<TransferVerifiedEvent>>,
}

impl EventHooks {
    pub fn on_transfer_verified<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(TransferVerifiedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_transfer_verified = Some(Arc::new(f));
        self
    }
}

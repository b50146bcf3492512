mod escrow_address;

pub use escrow_address::{escrow_email_for, generate_transfer_code, platform_hint_from_recipient};

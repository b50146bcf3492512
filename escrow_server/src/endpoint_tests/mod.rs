mod mocks;
mod parse;
mod webhook;

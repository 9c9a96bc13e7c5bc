use std::sync::Arc;

use stock::{Resolver, provider::InvestingProvider};

pub mod command;
pub mod config;
pub mod shutdown;
pub mod webhook;

pub struct Data {
    pub resolver: Arc<Resolver>,
    pub investing: Arc<InvestingProvider>,
}

pub type Error = anyhow::Error;
pub type Context<'a> = poise::Context<'a, Data, Error>;

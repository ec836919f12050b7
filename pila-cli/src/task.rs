use clap::Args;
use pila_sdk::Client;

use crate::handle_resp;

#[derive(Args, Debug)]
pub struct Push {
    /// Task payload
    data: String,
}

impl Push {
    pub async fn handle(self, sdk: &Client) {
        handle_resp(sdk.push(&self.data).await);
    }
}

#[derive(Args, Debug)]
pub struct Pop {
    /// Lease duration in seconds
    #[arg(short, long, default_value_t = 300)]
    timeout: i64,
}

impl Pop {
    pub async fn handle(self, sdk: &Client) {
        handle_resp(sdk.pop(self.timeout).await);
    }
}

#[derive(Args, Debug)]
pub struct Confirm {
    /// Lease key returned by pop
    key: String,
}

impl Confirm {
    pub async fn handle(self, sdk: &Client) {
        handle_resp(sdk.confirm(&self.key).await);
    }
}

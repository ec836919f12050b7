use pila_sdk::Client;

use crate::handle_resp;

pub async fn handle_status(sdk: &Client) {
    handle_resp(sdk.status().await);
}

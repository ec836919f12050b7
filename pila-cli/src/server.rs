use std::net::SocketAddr;

use clap::Args;

#[derive(Args, Debug)]
pub struct Server {
    #[arg(short, long, default_value = "127.0.0.1:9080", env = "PILA_LISTEN")]
    listen: SocketAddr,
    #[arg(short, long, env = "PILA_STORAGE_PATH")]
    storage_path: Option<String>,
}

impl Server {
    pub async fn handle(self) {
        match self.storage_path {
            Some(storage_path) => {
                let config = pila_system::Config::new(self.listen, storage_path);

                pila_system::start(config, pila_system::shutdown_signal())
                    .await
                    .unwrap()
            }
            None => {
                println!("Starting in dev mode. All data will be erased on exit.");
                let tmpdir = tempfile::tempdir().unwrap();
                let storage_path = tmpdir
                    .path()
                    .join("task-stack")
                    .to_str()
                    .unwrap()
                    .to_string();

                let config = pila_system::Config::new(self.listen, storage_path);

                pila_system::start(config, pila_system::shutdown_signal())
                    .await
                    .unwrap()
            }
        }
    }
}

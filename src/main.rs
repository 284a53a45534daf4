use solarmax_rs::graphite::GraphiteEmitter;
use solarmax_rs::inverter::Inverter;
use solarmax_rs::poller::{Poller, StateData};
use solarmax_rs::settings::Settings;
use solarmax_rs::{exporter, logging, Error};
use std::sync::Arc;

async fn run(settings: Settings) -> Result<(), Error> {
    let inverter = Inverter::new(settings.inverter_addr(), settings.inverter_timeout());
    let emitter =
        GraphiteEmitter::bind(&settings.graphite_addr(), settings.graphite_prefix.clone()).await?;
    let poller = Poller::new(
        inverter,
        emitter,
        settings.poll_interval(),
        settings.max_connect_failures,
    );
    let state = Arc::new(StateData::default());

    match settings.exporter_port {
        Some(port) => {
            let figment = rocket::Config::figment()
                .merge(("port", port))
                .merge(("address", settings.exporter_address.clone()));
            let server = exporter::rocket(figment, state.clone()).launch();

            /* rocket owns Ctrl-C handling when it runs */
            tokio::select! {
                result = poller.run(&state) => result,
                result = server => result
                    .map(|_| ())
                    .map_err(|e| Error::Exporter(e.to_string())),
            }
        }
        None => {
            tokio::select! {
                result = poller.run(&state) => result,
                _ = tokio::signal::ctrl_c() => {
                    log::info!("interrupted, shutting down");
                    Ok(())
                }
            }
        }
    }
}

#[rocket::main]
async fn main() {
    logging::init();

    let result = match Settings::from_env() {
        Ok(settings) => run(settings).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

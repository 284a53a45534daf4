use crate::metrics;
use crate::poller::StateData;
use crate::Error;
use rocket::figment::Figment;
use rocket::http::ContentType;
use rocket::{Build, Rocket, State};
use std::sync::Arc;

#[get("/metrics")]
fn metrics_route() -> Result<String, Error> {
    metrics::read()
}

/// Raw response and decoded metrics of the last successful cycle, 404 until there is one.
#[get("/dump")]
fn dump_route(state: &State<Arc<StateData>>) -> Result<Option<(ContentType, String)>, Error> {
    state
        .latest()
        .map(|snapshot| serde_json::to_string(&snapshot).or(Err(Error::FormatError)))
        .transpose()
        .map(|json| json.map(|json| (ContentType::JSON, json)))
}

pub fn rocket(figment: Figment, state: Arc<StateData>) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(state)
        .mount("/", routes![metrics_route, dump_route])
}

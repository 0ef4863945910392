pub mod api;
pub mod catchers;
pub mod config;
pub mod error;
pub mod gateway;
pub mod publisher;
pub mod render;
pub mod routes;
pub mod topic;

use rocket::{catchers, routes, Build, Rocket};

use crate::catchers::{internal_error, not_found};
use crate::routes::{healthcheck, save, view, AppState};

pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .mount("/", routes![healthcheck, view, save])
        .register("/", catchers![not_found, internal_error])
}

#[cfg(test)]
mod test_support;

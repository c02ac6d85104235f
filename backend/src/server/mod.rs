//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use commission_backend::Trace;
#[cfg(debug_assertions)]
use commission_backend::doc::ApiDoc;
use commission_backend::inbound::http::bids::{accept_bid, list_bids, submit_bid};
use commission_backend::inbound::http::commissions::{
    create_commission, dashboard, get_commission, list_commissions, revise_commission,
    transition_commission,
};
use commission_backend::inbound::http::health::{HealthState, live, ready};
use commission_backend::inbound::http::profiles::{get_profile, sign_out, sign_up, update_profile};
use commission_backend::inbound::http::session_config::SessionSettings;
use commission_backend::inbound::http::state::HttpState;
use commission_backend::inbound::http::validation::json_config;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: SessionSettings,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
    } = deps;

    let api = web::scope("/api/v1")
        .wrap(session.middleware())
        .service(sign_up)
        .service(sign_out)
        .service(get_profile)
        .service(update_profile)
        .service(create_commission)
        .service(list_commissions)
        .service(get_commission)
        .service(revise_commission)
        .service(transition_commission)
        .service(dashboard)
        .service(submit_bid)
        .service(list_bids)
        .service(accept_bid);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let ServerConfig {
        session,
        bind_addr,
        ..
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            session: session.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

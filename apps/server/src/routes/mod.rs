use actix_web::web::ServiceConfig;

mod check;
mod health;

pub fn routes(cfg: &mut ServiceConfig) {
    cfg.configure(health::routes).configure(check::routes);
}

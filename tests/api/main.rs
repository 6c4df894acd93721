mod helpers;

mod auth;
mod health_check;
mod resignations;

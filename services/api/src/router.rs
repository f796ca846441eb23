use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use morea_core::health::{healthz, readyz};
use morea_core::middleware::request_id_layer;

use crate::handlers::{
    access::{validate_card, validate_pin},
    auth::{get_session, login, logout},
    card::{create_card, delete_card, get_cards, link_card, unlink_card, update_card},
    device::{
        add_device_role, delete_device, get_device, get_device_access_logs, get_device_roles,
        get_devices, identify_device, remove_device_role, report_device_ip, update_device,
    },
    lab::{
        add_lab_members, create_lab, delete_lab, get_lab, get_lab_access_logs, get_labs,
        remove_lab_member, unlock_lab, update_lab,
    },
    metering::{get_chart_data, store_data},
    reservation::{
        create_reservation, delete_reservation, get_my_reservations, get_reservations,
    },
    role::{
        assign_user_role, create_role, delete_role, get_roles, remove_user_role, update_role,
    },
    user::{
        create_user, delete_user, get_me, get_user, get_user_cards, get_user_labs,
        get_user_reservations, get_users, update_user,
    },
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Controller-facing (no session; device credentials in body)
        .route("/approximations/auth", post(validate_card))
        .route("/devices/auth/pin", post(validate_pin))
        .route("/devices/identify", post(identify_device))
        .route("/devices/ip", post(report_device_ip))
        .route("/store-data", post(store_data))
        // Session
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(get_session))
        .route("/auth/signup", post(create_user))
        // Users
        .route("/users", get(get_users))
        .route("/users", post(create_user))
        .route("/users/@me", get(get_me))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}", patch(update_user))
        .route("/users/{id}", delete(delete_user))
        .route("/users/{id}/cards", get(get_user_cards))
        .route("/users/{id}/cards/{card_id}", delete(unlink_card))
        .route("/users/{id}/labs", get(get_user_labs))
        .route("/users/{id}/reservations", get(get_user_reservations))
        .route("/users/{id}/roles", post(assign_user_role))
        .route("/users/{id}/roles/{role_id}", delete(remove_user_role))
        // Cards
        .route("/cards", get(get_cards))
        .route("/cards", post(create_card))
        .route("/cards/link", post(link_card))
        .route("/cards/{id}", patch(update_card))
        .route("/cards/{id}", delete(delete_card))
        // Devices (admin)
        .route("/devices", get(get_devices))
        .route("/devices/{id}", get(get_device))
        .route("/devices/{id}", patch(update_device))
        .route("/devices/{id}", delete(delete_device))
        .route("/devices/{id}/roles", get(get_device_roles))
        .route("/devices/{id}/roles", post(add_device_role))
        .route("/devices/{id}/roles/{role_id}", delete(remove_device_role))
        .route("/devices/{id}/access-logs", get(get_device_access_logs))
        // Labs
        .route("/labs", get(get_labs))
        .route("/labs", post(create_lab))
        .route("/labs/unlock/{lab_id}", post(unlock_lab))
        .route("/labs/{id}", get(get_lab))
        .route("/labs/{id}", patch(update_lab))
        .route("/labs/{id}", delete(delete_lab))
        .route("/labs/{id}/access-logs", get(get_lab_access_logs))
        .route("/labs/{id}/members", post(add_lab_members))
        .route("/labs/{id}/members/{user_id}", delete(remove_lab_member))
        // Reservations
        .route("/reservations", get(get_reservations))
        .route("/reservations", post(create_reservation))
        .route("/reservations/@me", get(get_my_reservations))
        .route("/reservations/{id}", delete(delete_reservation))
        // Metering
        .route("/metering/{device_id}/chart", get(get_chart_data))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}

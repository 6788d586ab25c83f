pub(crate) mod auth_routes;
pub(crate) mod handlers;
pub(crate) mod orders;
pub(crate) mod products;
pub(crate) mod response_contract;
pub(crate) mod users;

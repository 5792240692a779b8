pub(crate) mod api_message;
pub(crate) mod balancer;
pub(crate) mod notification;

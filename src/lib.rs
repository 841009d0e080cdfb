pub mod config;
pub mod domain {
    pub mod callback;
    pub mod payment;
}
pub mod gateways;
pub mod http {
    pub mod handlers {
        pub mod callbacks;
        pub mod ops;
    }
}
pub mod repo {
    pub mod dedup_mem;
    pub mod dedup_repo;
    pub mod payments_repo;
}
pub mod service {
    pub mod callback_dispatcher;
    pub mod completion;
    pub mod idempotency_gate;
}

#[derive(Clone)]
pub struct AppState {
    pub callback_dispatcher: service::callback_dispatcher::CallbackDispatcher,
    pub payments_repo: repo::payments_repo::PaymentsRepo,
}

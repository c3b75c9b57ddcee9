pub(crate) mod client_errors;
pub(crate) mod client_model;
pub(crate) mod client_repository;
pub(crate) mod client_service;
pub(crate) mod client_traits;

pub use client_errors::ClientError;
pub use client_model::{AccountStatus, AccountType, Client, ClientBatch, ClientDB, NewClientRecord};
pub use client_repository::ClientRepository;
pub use client_service::ClientService;
pub use client_traits::{ClientRepositoryTrait, ClientServiceTrait};

pub(crate) mod prices_model;
pub(crate) mod prices_repository;
pub(crate) mod prices_traits;

// Re-export the public interface
pub use prices_model::PriceRecord;
pub use prices_repository::PriceRepository;
pub use prices_traits::PriceRepositoryTrait;

//! Evac Providers - external feed adapters
//!
//! Each adapter turns one upstream API into [`evac_core::Feature`]s behind the
//! [`FeatureProvider`] trait. Adapters never panic on malformed upstream data;
//! they drop the bad items or return a [`ProviderError`].

pub mod directions;
pub mod disaster;
pub mod factory;
mod http;
pub mod places;
pub mod roads;
pub mod seismic;
pub mod settings;
pub mod types;
pub mod weather;

pub use directions::DirectionsProvider;
pub use disaster::DisasterDeclarationProvider;
pub use factory::{ProviderSet, SharedProvider};
pub use http::build_client;
pub use places::PlacesProvider;
pub use roads::RoadNetworkProvider;
pub use seismic::SeismicProvider;
pub use settings::ProviderSettings;
pub use types::{FeatureProvider, ProviderError};
pub use weather::WeatherAlertProvider;

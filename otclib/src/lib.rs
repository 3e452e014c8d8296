pub mod analysis;
pub mod delivery;
pub mod logging;
pub mod market;
pub mod rates;
pub mod util;
pub mod view;

pub mod logistic;
pub mod scaler;

pub use logistic::{ClassWeight, FitReport, LogisticConfig, LogisticRegression};
pub use scaler::StandardScaler;

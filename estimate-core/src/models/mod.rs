mod dimensions;
mod estimate;
mod labor;
mod material;

pub use dimensions::Dimensions;
pub use estimate::{COPY_SUFFIX, Estimate, EstimateFormData, FormError};
pub use labor::{Labor, RateType};
pub use material::{DEFAULT_UNIT, Material};

mod calculation_environment;
mod queue_header;

#[rustfmt::skip]
pub use self::{
    calculation_environment::CalculationEnvironment,
    queue_header::QueueHeader,
};

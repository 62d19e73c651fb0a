pub mod commentary;
pub mod day_load;
pub mod routing;
pub mod scheduler;

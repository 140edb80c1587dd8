pub mod assignment;
pub mod listing;

pub use assignment::{AssignmentService, ClaimResult};
pub use listing::ListingService;

mod activity;
mod path;
mod point;
mod review;
mod subscriber;
mod user;

pub use activity::Activity;
pub use path::{CreatedPath, Path, PathDetail, PathOwner};
pub use point::Point;
pub use review::Review;
pub use subscriber::Subscriber;
pub use user::{User, UserDetail};

#[cfg(test)]
pub(crate) use point::NewPoint;
#[cfg(test)]
pub(crate) use user::NewUser;

mod jwt;
mod password;

pub use jwt::{create_token, create_validator, jwt_middleware, JWTUserRequest, Keys};
pub use password::{hash_password, verify_password};

/// Router Module Index
///
/// Routes are split by access level so the guard is applied once per module, as a layer,
/// instead of inside each handler.

/// Routes open to anonymous callers: catalogue reads, user listing and login.
pub mod public;

/// Product mutations. Wrapped in `auth_middleware` and the manager role gate by `create_router`.
pub mod manager;

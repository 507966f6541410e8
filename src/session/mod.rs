pub mod gate;

pub use gate::{
    route_policy, Access, RoutePolicy, Session, SessionError, SessionGate, SessionProvider,
    HOME_ROUTE, SIGN_IN_ROUTE,
};

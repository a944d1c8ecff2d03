mod timing;

pub use timing::ScopedTimer;

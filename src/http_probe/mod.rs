pub mod error;
pub mod probe;
pub mod resolver;
pub mod result;
pub mod target;

pub mod prelude {
    pub use super::error::ProbeError;
    pub use super::probe::Prober;
    pub use super::resolver::HostResolver;
    pub use super::result::ProbeResult;
    pub use super::target::Target;
}

use std::fmt::Write;

/// Render an error and its whole `source()` chain on a single line.
pub fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn report_walks_the_source_chain() {
        let err = Outer(std::io::Error::other("inner"));
        assert_eq!(report(&err), "outer: inner");
    }
}

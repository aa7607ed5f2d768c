use std::io::{self, Write};
use std::time::Duration;

use crate::http_probe::result::ProbeResult;

/// Print one block per result, in the order given.
pub fn write_report<W: Write>(out: &mut W, results: &[ProbeResult]) -> io::Result<()> {
    for result in results {
        writeln!(out, "Address: {}", result.target)?;
        writeln!(out, "Response Code: {}", result.status_code)?;
        writeln!(out, "Response Time: {}ms", result.latency.as_millis())?;
        if let Some(error) = &result.error {
            writeln!(out, "Response Error: {}", error.report())?;
        }
    }
    out.flush()
}

pub fn write_sleeping<W: Write>(out: &mut W, interval: Duration) -> io::Result<()> {
    writeln!(out, "Sleeping {interval:?}")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_probe::prelude::*;

    fn render(results: &[ProbeResult]) -> String {
        let mut out = Vec::new();
        write_report(&mut out, results).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn prints_a_block_per_result() {
        let google = Target::parse("https://www.google.com").unwrap();
        let amazon = Target::parse("https://www.amazonfdad.com").unwrap();

        let output = render(&[
            ProbeResult::response(&google, 200, Duration::from_micros(10_900)),
            ProbeResult::failure(
                &amazon,
                ProbeError::Resolution {
                    host: "www.amazonfdad.com".to_string(),
                    reason: "no record found".to_string(),
                },
            ),
        ]);

        assert_eq!(
            output,
            "Address: https://www.google.com\n\
             Response Code: 200\n\
             Response Time: 10ms\n\
             Address: https://www.amazonfdad.com\n\
             Response Code: 0\n\
             Response Time: 0ms\n\
             Response Error: unable to resolve dns name www.amazonfdad.com: no record found\n"
        );
    }

    #[test]
    fn sleeping_line_uses_the_interval() {
        let mut out = Vec::new();
        write_sleeping(&mut out, Duration::from_secs(30)).unwrap();
        write_sleeping(&mut out, Duration::from_millis(1500)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Sleeping 30s\nSleeping 1.5s\n");
    }
}

//! Prometheus text exposition format (version 0.0.4).

use std::fmt::Write;

use super::{MetricFamily, SampleValue};

pub(crate) fn encode(families: &[MetricFamily]) -> String {
    let mut out = String::new();
    for family in families {
        if family.metrics.is_empty() {
            continue;
        }
        let _ = writeln!(out, "# HELP {} {}", family.name, escape_help(&family.help));
        let _ = writeln!(out, "# TYPE {} {}", family.name, family.kind);

        for sample in &family.metrics {
            match &sample.value {
                SampleValue::Counter(value) => {
                    write_series(&mut out, &family.name, "", &sample.labels, None, &value.to_string());
                },
                SampleValue::Histogram(h) => {
                    for (bound, count) in &h.buckets {
                        let le = format_float(*bound);
                        write_series(&mut out, &family.name, "_bucket", &sample.labels, Some(&le), &count.to_string());
                    }
                    write_series(&mut out, &family.name, "_bucket", &sample.labels, Some("+Inf"), &h.count.to_string());
                    write_series(&mut out, &family.name, "_sum", &sample.labels, None, &format_float(h.sum));
                    write_series(&mut out, &family.name, "_count", &sample.labels, None, &h.count.to_string());
                },
            }
        }
    }
    out
}

fn write_series(out: &mut String, name: &str, suffix: &str, labels: &[(String, String)], le: Option<&str>, value: &str) {
    out.push_str(name);
    out.push_str(suffix);

    let pairs = labels.iter().map(|(k, v)| (k.as_str(), v.as_str())).chain(le.map(|le| ("le", le)));
    let mut first = true;
    for (key, val) in pairs {
        out.push(if first { '{' } else { ',' });
        first = false;
        let _ = write!(out, "{key}=\"{}\"", escape_label(val));
    }
    if !first {
        out.push('}');
    }

    out.push(' ');
    out.push_str(value);
    out.push('\n');
}

fn format_float(value: f64) -> String {
    if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else if value.is_nan() {
        "NaN".to_string()
    } else {
        value.to_string()
    }
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

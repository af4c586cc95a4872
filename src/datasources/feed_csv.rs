use crate::models::{parse_field, ClimateRow, ProbeRow, ProbeSlot};
use chrono::{NaiveDate, NaiveDateTime};

const MIN_FIELDS: usize = 5;
const PROBE_FIELDS: usize = 6;

/// `YYYY-MM-DD HH:MM:SS`, or the older `MM-DD-YYYY HH:MM:SS a.m.` export.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(ts);
    }
    parse_legacy_timestamp(trimmed)
}

fn parse_legacy_timestamp(text: &str) -> Option<NaiveDateTime> {
    let mut parts = text.split_whitespace();
    let (date, time, meridiem) = (parts.next()?, parts.next()?, parts.next()?);

    let mut date_parts = date.split('-').map(|p| p.parse::<u32>().ok());
    let month = date_parts.next()??;
    let day = date_parts.next()??;
    let year = date_parts.next()?? as i32;

    let mut time_parts = time.split(':').map(|p| p.parse::<u32>().ok());
    let mut hour = time_parts.next()??;
    let minute = time_parts.next()??;
    let second = time_parts.next()??;

    let meridiem = meridiem.replace('.', "").to_lowercase();
    if meridiem.starts_with('p') && hour != 12 {
        hour += 12;
    } else if meridiem.starts_with('a') && hour == 12 {
        hour = 0;
    }

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

/// Split on commas, falling back to tabs for older exports.
fn split_record(line: &str) -> Option<Vec<String>> {
    let mut fields: Vec<&str> = line.split(',').collect();
    if fields.len() < MIN_FIELDS {
        fields = line.split('\t').collect();
    }
    if fields.len() < MIN_FIELDS {
        return None;
    }
    Some(fields.iter().map(|f| f.trim().to_string()).collect())
}

/// Data lines after the header, NUL bytes removed and blanks skipped.
fn data_lines(text: &str) -> Vec<String> {
    let cleaned = text.replace('\0', "");
    cleaned
        .trim()
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Climate table rows normalized to
/// `timestamp, location, temperature, humidity, vpd, dew_point`.
pub fn parse_climate_csv(text: &str) -> Vec<ClimateRow> {
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for line in data_lines(text) {
        let fields = match split_record(&line) {
            Some(f) => f,
            None => {
                skipped += 1;
                continue;
            }
        };

        let legacy = fields.len() == MIN_FIELDS;
        let mut f = fields.into_iter();
        let mut next = || f.next().unwrap_or_default();
        let values: [String; 6] = if legacy {
            // timestamp, temperature, humidity, dew_point, vpd
            let (ts, temp, hum, dew, vpd) = (next(), next(), next(), next(), next());
            [ts, "greenhouse".to_string(), temp, hum, vpd, dew]
        } else {
            [next(), next(), next(), next(), next(), next()]
        };

        let timestamp = parse_timestamp(&values[0]);
        rows.push(ClimateRow { values, timestamp });
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} short climate rows", skipped);
    }
    rows
}

/// Probe packets `timestamp, device, temperature_c, illuminance_lux,
/// moisture_pct, conductivity_us_cm`. Unknown devices and undated rows are dropped.
pub fn parse_probe_csv(text: &str) -> Vec<ProbeRow> {
    data_lines(text)
        .iter()
        .filter_map(|line| split_record(line))
        .filter(|fields| fields.len() >= PROBE_FIELDS)
        .filter_map(|fields| {
            Some(ProbeRow {
                timestamp: parse_timestamp(&fields[0])?,
                device: probe_device(&fields[1])?,
                temperature_c: parse_field(&fields[2]),
                illuminance_lux: parse_field(&fields[3]),
                moisture_pct: parse_field(&fields[4]),
                conductivity_us_cm: parse_field(&fields[5]),
                timestamp_text: fields[0].clone(),
            })
        })
        .collect()
}

fn probe_device(name: &str) -> Option<ProbeSlot> {
    match name {
        "first" => Some(ProbeSlot::First),
        "second" => Some(ProbeSlot::Second),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parse_iso_timestamp() {
        let ts = parse_timestamp("2025-06-01 14:05:09").unwrap();
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (14, 5, 9));
    }

    #[test]
    fn parse_legacy_timestamps() {
        let pm = parse_timestamp("06-01-2025 03:15:00 p.m.").unwrap();
        assert_eq!(pm.hour(), 15);
        assert_eq!(pm.date(), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());

        let noon = parse_timestamp("06-01-2025 12:00:00 p.m.").unwrap();
        assert_eq!(noon.hour(), 12);

        let midnight = parse_timestamp("06-01-2025 12:30:00 a.m.").unwrap();
        assert_eq!(midnight.hour(), 0);

        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("13-40-2025 10:00:00 a.m.").is_none());
    }

    #[test]
    fn climate_csv_handles_mixed_formats() {
        let text = "timestamp,location,temp,hum,vpd,dew\n\
                    2025-06-01 10:00:00,greenhouse,25.1,80,0.63,21.4\n\
                    \n\
                    06-01-2025 10:10:00 a.m.\t25.3\t79\t21.2\t0.66\n\
                    2025-06-01 10:20:00,outdoor,18.0,71,0.59,12.6\r\n\
                    broken,row\n";
        let rows = parse_climate_csv(text);
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].location(), "greenhouse");
        assert_eq!(rows[0].vpd_kpa(), Some(0.63));

        // Legacy tab row swaps dew point and VPD into the current order
        assert_eq!(rows[1].location(), "greenhouse");
        assert_eq!(rows[1].vpd_kpa(), Some(0.66));
        assert_eq!(rows[1].dew_point_c(), Some(21.2));
        assert_eq!(rows[1].timestamp.unwrap().hour(), 10);

        assert_eq!(rows[2].location(), "outdoor");
        assert_eq!(rows[2].dew_point_c(), Some(12.6));
    }

    #[test]
    fn climate_csv_strips_nul_bytes() {
        let text = "h1,h2,h3,h4,h5,h6\n2025-06-01 10:00:00,green\0house,25,80,0.6,20\0\n";
        let rows = parse_climate_csv(text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].location(), "greenhouse");
        assert_eq!(rows[0].dew_point_c(), Some(20.0));
    }

    #[test]
    fn header_only_is_empty() {
        assert!(parse_climate_csv("timestamp,location,temp,hum,vpd,dew\n").is_empty());
        assert!(parse_climate_csv("").is_empty());
    }

    #[test]
    fn probe_csv_keeps_known_devices() {
        let text = "timestamp,device,temperature_c,illuminance_lux,moisture_pct,conductivity_us_cm\n\
                    2025-06-01 10:00:00,first,24.0,6100,22,410\n\
                    2025-06-01 10:00:00,second,24.2,,nan,395\n\
                    2025-06-01 10:00:00,C4:7C:8D:00:00:00,24.2,5000,20,300\n\
                    not-a-date,first,24.0,6100,22,410\n";
        let rows = parse_probe_csv(text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].device, ProbeSlot::First);
        assert_eq!(rows[0].illuminance_lux, Some(6100.0));
        assert_eq!(rows[1].device, ProbeSlot::Second);
        assert_eq!(rows[1].illuminance_lux, None);
        assert_eq!(rows[1].moisture_pct, None);
        assert_eq!(rows[1].conductivity_us_cm, Some(395.0));
    }
}

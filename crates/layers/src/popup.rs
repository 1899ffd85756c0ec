use formats::Feature;
use html_escape::encode_text;
use serde::{Deserialize, Serialize};

const MISSING: &str = "N/A";

/// How a feature's popup text is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PopupTemplate {
    /// `<p><b>City:</b> Tokyo</p><p><b>Population in 1990:</b> 32.5 million</p>`
    ///
    /// The value label is `value_prefix` followed by the attribute's suffix
    /// (`Pop_1990` -> `1990`).
    AttributeSeries {
        title_field: String,
        value_prefix: String,
        #[serde(default)]
        unit: Option<String>,
    },
    /// `<b>Date:</b> 3/15/2021<br><b>Total Vehicles:</b> 4`
    Fixed {
        title_label: String,
        title_field: String,
        value_label: String,
    },
    /// Uses a property holding ready-made popup text.
    Property { field: String },
    None,
}

impl PopupTemplate {
    pub fn render(&self, feature: &Feature, attribute: &str) -> Option<String> {
        match self {
            PopupTemplate::AttributeSeries {
                title_field,
                value_prefix,
                unit,
            } => {
                let suffix = attribute.split('_').nth(1).unwrap_or(attribute);
                let value = match (feature.text(attribute), unit) {
                    (Some(v), Some(unit)) => format!("{} {}", encode_text(&v), encode_text(unit)),
                    (Some(v), None) => encode_text(&v).into_owned(),
                    (None, _) => MISSING.to_string(),
                };
                Some(format!(
                    "<p><b>{}:</b> {}</p><p><b>{} {}:</b> {}</p>",
                    encode_text(title_field),
                    field_text(feature, title_field),
                    encode_text(value_prefix),
                    encode_text(suffix),
                    value
                ))
            }
            PopupTemplate::Fixed {
                title_label,
                title_field,
                value_label,
            } => Some(format!(
                "<b>{}:</b> {}<br><b>{}:</b> {}",
                encode_text(title_label),
                field_text(feature, title_field),
                encode_text(value_label),
                field_text(feature, attribute)
            )),
            PopupTemplate::Property { field } => feature.text(field),
            PopupTemplate::None => None,
        }
    }
}

fn field_text(feature: &Feature, field: &str) -> String {
    match feature.text(field) {
        Some(v) => encode_text(&v).into_owned(),
        None => MISSING.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::PopupTemplate;
    use formats::Feature;
    use serde_json::{Value, json};

    fn feature(props: Value) -> Feature {
        Feature {
            id: None,
            properties: props.as_object().cloned().unwrap_or_default(),
            geometry: None,
        }
    }

    #[test]
    fn population_popup_uses_year_suffix() {
        let t = PopupTemplate::AttributeSeries {
            title_field: "City".to_string(),
            value_prefix: "Population in".to_string(),
            unit: Some("million".to_string()),
        };
        let html = t
            .render(&feature(json!({"City": "Tokyo", "Pop_1990": 12.3})), "Pop_1990")
            .unwrap();
        assert_eq!(
            html,
            "<p><b>City:</b> Tokyo</p><p><b>Population in 1990:</b> 12.3 million</p>"
        );
    }

    #[test]
    fn vehicle_popup_marks_missing_values() {
        let t = PopupTemplate::Fixed {
            title_label: "Date".to_string(),
            title_field: "REPORTDATE".to_string(),
            value_label: "Total Vehicles".to_string(),
        };
        let html = t
            .render(
                &feature(json!({"REPORTDATE": "3/15/2021", "TOTAL_VEHICLES": 4})),
                "TOTAL_VEHICLES",
            )
            .unwrap();
        assert_eq!(html, "<b>Date:</b> 3/15/2021<br><b>Total Vehicles:</b> 4");

        let html = t.render(&feature(json!({"TOTAL_VEHICLES": null})), "TOTAL_VEHICLES").unwrap();
        assert_eq!(html, "<b>Date:</b> N/A<br><b>Total Vehicles:</b> N/A");
    }

    #[test]
    fn property_values_are_escaped() {
        let t = PopupTemplate::Fixed {
            title_label: "Date".to_string(),
            title_field: "Date".to_string(),
            value_label: "Note".to_string(),
        };
        let html = t
            .render(&feature(json!({"Date": "<script>", "n": "a & b"})), "n")
            .unwrap();
        assert_eq!(html, "<b>Date:</b> &lt;script&gt;<br><b>Note:</b> a &amp; b");
    }

    #[test]
    fn property_and_none_templates() {
        let f = feature(json!({"popupContent": "This is where the Rockies play!"}));
        let t = PopupTemplate::Property {
            field: "popupContent".to_string(),
        };
        assert_eq!(t.render(&f, "x").as_deref(), Some("This is where the Rockies play!"));
        assert_eq!(PopupTemplate::None.render(&f, "x"), None);
    }
}

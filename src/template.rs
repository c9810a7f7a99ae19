use crate::config::MapConfig;
use crate::error::Result;
use crate::overlay::Bounds;

/// How the page gets its GeoJSON.
#[derive(Debug, Clone, PartialEq)]
pub enum MapData {
  Embedded(String),
  Referenced(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageOverlay {
  pub file_name: String,
  pub bounds: Bounds,
  pub opacity: f64,
}

#[derive(Debug, Clone)]
pub struct MapPage<'a> {
  pub title: String,
  pub config: &'a MapConfig,
  pub data: MapData,
  pub overlay: Option<PageOverlay>,
}

pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}

// `</` and U+2028/U+2029 are legal in JSON strings but not in inline script
pub fn escape_script_json(json: &str) -> String {
  json
    .replace("</", "<\\/")
    .replace('\u{2028}', "\\u2028")
    .replace('\u{2029}', "\\u2029")
}

fn js_string(s: &str) -> Result<String> {
  Ok(escape_script_json(&serde_json::to_string(s)?))
}

fn overlay_script(overlay: &Option<PageOverlay>) -> Result<String> {
  let overlay = match overlay {
    Some(overlay) => overlay,
    None => return Ok("    const overlayBounds = null;\n".to_string()),
  };
  let b = overlay.bounds;
  Ok(format!(
    "    const overlayBounds = L.latLngBounds([[{}, {}], [{}, {}]]);
    L.imageOverlay({}, overlayBounds, {{ opacity: {} }}).addTo(map);
",
    b.south,
    b.west,
    b.north,
    b.east,
    js_string(&overlay.file_name)?,
    overlay.opacity
  ))
}

fn data_script(data: &MapData) -> Result<String> {
  Ok(match data {
    MapData::Embedded(json) => format!(
      "    const geoData = {};
    showData(geoData);
",
      escape_script_json(json)
    ),
    MapData::Referenced(file_name) => format!(
      "    fetch({})
      .then(function(response) {{ return response.json(); }})
      .then(showData)
      .catch(function(err) {{ console.error('Could not load map data', err); }});
",
      js_string(file_name)?
    ),
  })
}

pub fn render(page: &MapPage) -> Result<String> {
  let config = page.config;
  let leaflet = format!("https://unpkg.com/leaflet@{}/dist", config.leaflet_version());
  let style = &config.style;

  let popup_script = if config.popups() {
    "        onEachFeature: function(feature, layer) {
          if (feature.properties) {
            let popup = '<div style=\"font-family:sans-serif; color:black;\">';
            for (let k in feature.properties) {
              popup += '<b>' + escapeHtml(k) + ':</b> ' + escapeHtml(feature.properties[k]) + '<br>';
            }
            popup += '</div>';
            layer.bindPopup(popup);
          }
        }
"
  } else {
    ""
  };

  Ok(format!(
    r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>{title}</title>
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <link rel="stylesheet" href="{leaflet}/leaflet.css" />
  <style>
    body, html, #map {{ height: 100%; margin: 0; padding: 0; background: {background}; }}
  </style>
</head>
<body>
  <div id="map"></div>
  <script src="{leaflet}/leaflet.js"></script>
  <script>
    function escapeHtml(value) {{
      return String(value)
        .replace(/&/g, '&amp;')
        .replace(/</g, '&lt;')
        .replace(/>/g, '&gt;')
        .replace(/"/g, '&quot;');
    }}

    const map = L.map('map').setView([0, 0], 2);

    L.tileLayer({tile_url}, {{
      attribution: {attribution},
      maxZoom: {max_zoom}
    }}).addTo(map);

{overlay}
    function showData(geoData) {{
      const layer = L.geoJSON(geoData, {{
        style: {{
          color: {color},
          weight: {weight},
          fillColor: {fill_color},
          fillOpacity: {fill_opacity}
        }},
{popups}      }}).addTo(map);

      let bounds = layer.getBounds();
      if (overlayBounds) {{
        bounds = bounds.isValid() ? bounds.extend(overlayBounds) : overlayBounds;
      }}
      if (bounds.isValid()) {{
        map.fitBounds(bounds);
      }}
    }}

{data}  </script>
</body>
</html>
"#,
    title = escape_html(&page.title),
    leaflet = leaflet,
    background = escape_html(config.background()),
    tile_url = js_string(&config.tile_layer.url)?,
    attribution = js_string(&config.tile_layer.attribution)?,
    max_zoom = config.tile_layer.max_zoom,
    overlay = overlay_script(&page.overlay)?,
    color = js_string(&style.color)?,
    weight = style.weight,
    fill_color = js_string(&style.fill_color)?,
    fill_opacity = style.fill_opacity,
    popups = popup_script,
    data = data_script(&page.data)?,
  ))
}

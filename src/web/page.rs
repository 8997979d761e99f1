//! Dashboard page markup.

use crate::domain::{PERCENT_MAX, PERCENT_MIN, YEAR_MAX, YEAR_MIN};

pub(super) fn render() -> String {
    INDEX_HTML
        .replace("{{YEAR_MIN}}", &YEAR_MIN.to_string())
        .replace("{{YEAR_MAX}}", &YEAR_MAX.to_string())
        .replace("{{PERCENT_MIN}}", &PERCENT_MIN.to_string())
        .replace("{{PERCENT_MAX}}", &PERCENT_MAX.to_string())
}

const INDEX_HTML: &str = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8" />
    <title>Drug Reviews</title>
    <script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
    <style>
      body { margin: 0; padding: 16px; background: #000; }
      .panel { background: #111111; border-radius: 15px; padding: 10px 0 20px; color: white; }
      h1 { font-family: "Courier New", monospace; font-size: 40px; text-align: center; letter-spacing: 2px; }
      h2 { font-size: 25px; text-align: center; font-family: system-ui, sans-serif; }
      .subtitle { font-family: "Courier New", monospace; font-size: 20px; text-align: center; padding: 0 0 1px; }
      .closing { font-family: "Courier New", monospace; font-size: 20px; text-align: justify; padding: 0 50px; }
      .graph { padding: 10px 50px 20px; }
      .slider { display: flex; gap: 16px; justify-content: center; align-items: center; font-family: system-ui, sans-serif; }
      .slider input[type=range] { width: 35%; }
      .percent { display: flex; justify-content: center; }
      .percent input { width: 80px; font-size: 18px; text-align: center; }
      .error { color: #f87171; text-align: center; font-family: system-ui, sans-serif; min-height: 1.2em; }
    </style>
  </head>
  <body>
    <div class="panel">
      <h1>DRUG REVIEWS:</h1>
      <p class="subtitle">Acceptance and effectiveness based on user experiences</p>

      <h2>Data selection range</h2>
      <div class="slider">
        <span id="start-label">{{YEAR_MIN}}</span>
        <input id="start" type="range" min="{{YEAR_MIN}}" max="{{YEAR_MAX}}" step="1" value="{{YEAR_MIN}}" />
        <input id="end" type="range" min="{{YEAR_MIN}}" max="{{YEAR_MAX}}" step="1" value="{{YEAR_MAX}}" />
        <span id="end-label">{{YEAR_MAX}}</span>
      </div>
      <div id="years-error" class="error"></div>
      <div id="graph1" class="graph"></div>
      <div id="graph2" class="graph"></div>
      <div id="graph3" class="graph"></div>

      <h2>Enter the percentage of data to remove: {{PERCENT_MIN}}-{{PERCENT_MAX}}%</h2>
      <div class="percent">
        <input id="percent" type="number" placeholder="%" min="{{PERCENT_MIN}}" max="{{PERCENT_MAX}}" step="1" />
      </div>
      <div id="percent-error" class="error"></div>
      <div id="graph4" class="graph"></div>
      <h2 id="removed"></h2>

      <p class="closing">
        This study looks at how patients rate medical therapies over time, giving a
        view of the effectiveness and potential risks of drugs across health
        conditions grouped by category, to help safeguard patients by tracking the
        average usefulness and safety of the drugs on the market.
      </p>
    </div>

    <script>
      const startEl = document.getElementById("start");
      const endEl = document.getElementById("end");
      const percentEl = document.getElementById("percent");

      async function getJson(url) {
        const resp = await fetch(url);
        const body = await resp.json();
        if (!resp.ok) throw new Error(body.error || resp.statusText);
        return body;
      }

      function draw(id, figure) {
        Plotly.react(id, figure.data, figure.layout, { responsive: true });
      }

      async function updateYears() {
        let start = Number(startEl.value);
        let end = Number(endEl.value);
        if (start > end) {
          [start, end] = [end, start];
        }
        document.getElementById("start-label").textContent = start;
        document.getElementById("end-label").textContent = end;
        const errEl = document.getElementById("years-error");
        try {
          const view = await getJson(`/api/years?start=${start}&end=${end}`);
          errEl.textContent = "";
          draw("graph1", view.category_figure);
          draw("graph2", view.top_drugs_figure);
          draw("graph3", view.ratings_figure);
        } catch (e) {
          errEl.textContent = e.message;
        }
      }

      async function updateImputation() {
        const errEl = document.getElementById("percent-error");
        try {
          const view = await getJson(`/api/imputation?percent=${encodeURIComponent(percentEl.value)}`);
          errEl.textContent = "";
          draw("graph4", view.figure);
          document.getElementById("removed").textContent = view.label;
        } catch (e) {
          errEl.textContent = e.message;
        }
      }

      startEl.addEventListener("input", updateYears);
      endEl.addEventListener("input", updateYears);
      percentEl.addEventListener("input", updateImputation);

      updateYears();
      updateImputation();
    </script>
  </body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_filled() {
        let html = render();
        assert!(!html.contains("{{"));
        assert!(html.contains("min=\"2008\""));
        assert!(html.contains("max=\"2017\""));
    }
}

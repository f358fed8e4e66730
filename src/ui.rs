use crate::models::ChartMeta;

pub fn render_index(counter: Option<i64>, charts: &[ChartMeta]) -> String {
    let counter = counter.map_or_else(|| "--".to_string(), |value| value.to_string());
    let tabs: String = charts
        .iter()
        .enumerate()
        .map(|(idx, meta)| {
            format!(
                r#"<button class="tab{active}" type="button" data-kind="{key}" title="{description}" role="tab" aria-selected="{selected}">{title}</button>"#,
                active = if idx == 0 { " active" } else { "" },
                selected = idx == 0,
                key = meta.key,
                description = meta.description,
                title = meta.title,
            )
        })
        .collect();

    INDEX_HTML
        .replace("{{COUNTER}}", &counter)
        .replace("{{TABS}}", &tabs)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Quarter Dashboard</title>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/uplot@1.6.30/dist/uPlot.min.css" />
  <script src="https://cdn.jsdelivr.net/npm/uplot@1.6.30/dist/uPlot.iife.min.js"></script>
  <style>
    :root {
      --bg: #f1f5f9;
      --ink: #0f172a;
      --accent: #2563eb;
      --accent-2: #0f766e;
      --card: #ffffff;
      --shadow: 0 20px 48px rgba(15, 23, 42, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1080px, 100%);
      display: grid;
      gap: 24px;
    }

    .card {
      background: var(--card);
      border-radius: 20px;
      box-shadow: var(--shadow);
      padding: 28px;
      display: grid;
      gap: 18px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
    }

    .subtitle {
      margin: 0;
      color: #64748b;
    }

    .counter {
      display: flex;
      align-items: center;
      gap: 18px;
      flex-wrap: wrap;
    }

    .counter .value {
      font-size: 2.6rem;
      font-weight: 700;
      min-width: 4ch;
      text-align: center;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 20px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      color: white;
      background: var(--accent);
    }

    .btn-dec {
      background: var(--accent-2);
    }

    .tabs {
      display: flex;
      flex-wrap: wrap;
      gap: 6px;
    }

    .tab {
      background: rgba(15, 23, 42, 0.06);
      color: #475569;
      font-size: 0.85rem;
      padding: 8px 12px;
    }

    .tab.active {
      background: var(--accent);
      color: white;
    }

    #chart {
      min-height: 360px;
      overflow-x: auto;
    }

    .status {
      min-height: 1.2em;
      color: #475569;
    }

    .status[data-type="error"] {
      color: #b91c1c;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Quarter Dashboard</h1>
      <p class="subtitle">Shared counter and quarterly values, backed by PocketBase.</p>
    </header>

    <section class="card">
      <h2>Counter</h2>
      <div class="counter">
        <form id="dec-form" method="post" action="/counter/decrement">
          <button class="btn-dec" type="submit">-1</button>
        </form>
        <span id="counter" class="value">{{COUNTER}}</span>
        <form id="inc-form" method="post" action="/counter/increment">
          <button type="submit">+1</button>
        </form>
      </div>
    </section>

    <section class="card">
      <h2 id="chart-title">Quarterly Values</h2>
      <p id="chart-description" class="subtitle"></p>
      <div class="tabs" role="tablist">{{TABS}}</div>
      <div id="chart"></div>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const counterEl = document.getElementById('counter');
    const chartEl = document.getElementById('chart');
    const titleEl = document.getElementById('chart-title');
    const descriptionEl = document.getElementById('chart-description');
    const statusEl = document.getElementById('status');
    const tabs = Array.from(document.querySelectorAll('.tab'));

    let chart = null;
    let activeKind = tabs.length ? tabs[0].dataset.kind : 'bars';

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const toPaths = (spec) => {
      if (!spec) return undefined;
      switch (spec.type) {
        case 'bars':
          return uPlot.paths.bars({ size: [spec.size[0], spec.size[1] ?? Infinity], align: spec.align });
        case 'points':
          return uPlot.paths.points();
        case 'stepped':
          return uPlot.paths.stepped({ align: spec.align });
        case 'spline':
          return uPlot.paths.spline();
        default:
          return undefined;
      }
    };

    const toOptions = (payload) => {
      const { options, labels } = payload;
      const axes = options.axes.map(({ labelTicks, ...axis }) =>
        labelTicks
          ? { ...axis, values: (_, ticks) => ticks.map((tick) => labels[Math.round(tick)] ?? '') }
          : axis
      );
      const series = options.series.map((spec) => {
        const { paths, ...rest } = spec;
        const built = toPaths(paths);
        return built ? { ...rest, paths: built } : rest;
      });
      return { ...options, axes, series };
    };

    const loadChart = async (kind) => {
      const width = Math.round(chartEl.clientWidth);
      const res = await fetch(`/api/charts/${encodeURIComponent(kind)}?width=${width}`);
      if (!res.ok) {
        throw new Error(await res.text());
      }
      const payload = await res.json();
      const opts = toOptions(payload);
      if (chart) {
        chart.destroy();
      }
      chart = new uPlot(opts, payload.data, chartEl);
      titleEl.textContent = payload.options.title;
      const active = tabs.find((tab) => tab.dataset.kind === payload.kind);
      descriptionEl.textContent = active ? active.title : '';
    };

    const setActiveKind = (kind) => {
      activeKind = kind;
      tabs.forEach((tab) => {
        const isActive = tab.dataset.kind === kind;
        tab.classList.toggle('active', isActive);
        tab.setAttribute('aria-selected', String(isActive));
      });
      loadChart(kind).catch((err) => setStatus(err.message, 'error'));
    };

    const sendCounter = async (action) => {
      const res = await fetch('/api/counter', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ action })
      });
      if (!res.ok) {
        throw new Error(await res.text());
      }
      const data = await res.json();
      counterEl.textContent = data.value;
      setStatus('', '');
    };

    document.getElementById('inc-form').addEventListener('submit', (event) => {
      event.preventDefault();
      sendCounter('increment').catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('dec-form').addEventListener('submit', (event) => {
      event.preventDefault();
      sendCounter('decrement').catch((err) => setStatus(err.message, 'error'));
    });

    tabs.forEach((tab) => {
      tab.addEventListener('click', () => setActiveKind(tab.dataset.kind));
    });

    window.addEventListener('resize', () => {
      if (chart) {
        chart.setSize({ width: Math.max(chartEl.clientWidth, 600), height: chart.height });
      }
    });

    setActiveKind(activeKind);
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::catalog;

    #[test]
    fn index_lists_every_chart_tab() {
        let html = render_index(Some(7), &catalog());
        assert!(html.contains(r#"<span id="counter" class="value">7</span>"#));
        for meta in catalog() {
            assert!(html.contains(&format!(r#"data-kind="{}""#, meta.key)));
        }
        assert!(html.contains(r#"class="tab active" type="button" data-kind="bars""#));
    }

    #[test]
    fn index_shows_placeholder_without_counter() {
        let html = render_index(None, &[]);
        assert!(html.contains(r#"class="value">--</span>"#));
        assert!(!html.contains("{{"));
    }
}

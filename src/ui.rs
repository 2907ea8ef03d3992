use crate::calendar::{MonthGrid, intensity};
use crate::models::{PeriodStats, StatsSummary};
use chrono::Datelike;

pub fn render_index(
    date: &str,
    year: i32,
    month: u32,
    summary: &StatsSummary,
    grid: &MonthGrid,
) -> String {
    INDEX_HTML
        .replace("{{DATE}}", date)
        .replace("{{STAT_CARDS}}", &render_stat_cards(summary))
        .replace("{{CALENDAR_TITLE}}", &format!("{year}-{month:02}"))
        .replace("{{CALENDAR}}", &render_calendar(grid))
}

fn render_stat_cards(summary: &StatsSummary) -> String {
    let cards = [
        ("today", "Today", &summary.today),
        ("week", "This week", &summary.this_week),
        ("month", "This month", &summary.this_month),
        ("all", "All time", &summary.all_time),
    ];

    cards
        .iter()
        .map(|(key, label, stats)| render_stat_card(key, label, stats))
        .collect()
}

fn render_stat_card(key: &str, label: &str, stats: &PeriodStats) -> String {
    format!(
        concat!(
            "<div class=\"stat\">",
            "<span class=\"label\">{label}</span>",
            "<span class=\"value\" id=\"{key}-total\">{total}</span>",
            "<span class=\"detail\">",
            "<span id=\"{key}-count\">{count}</span> records / avg ",
            "<span id=\"{key}-avg\">{avg:.1}</span>",
            "</span></div>"
        ),
        label = label,
        key = key,
        total = stats.total_score,
        count = stats.record_count,
        avg = stats.average_score,
    )
}

fn render_calendar(grid: &MonthGrid) -> String {
    let mut html = String::from("<div class=\"cal-row cal-head\">");
    for name in ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"] {
        html.push_str(&format!("<span>{name}</span>"));
    }
    html.push_str("</div>");

    for week in grid {
        html.push_str("<div class=\"cal-row\">");
        for slot in week {
            match slot {
                Some(cell) => {
                    html.push_str(&format!(
                        "<span class=\"cal-day lvl-{}\" title=\"{}: {} records\">{}</span>",
                        intensity(cell.count),
                        cell.date,
                        cell.count,
                        cell.date.day(),
                    ));
                }
                None => html.push_str("<span class=\"cal-day pad\"></span>"),
            }
        }
        html.push_str("</div>");
    }
    html
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Failure Bank</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef3f8;
      --bg-2: #cfe0f0;
      --ink: #23303c;
      --accent: #3b82f6;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.16);
      --score-1: #10b981;
      --score-2: #f59e0b;
      --score-3: #ec4899;
      --score-4: #8b5cf6;
      --score-5: #3b82f6;
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e4ecf5 60%, #f2f6fa 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
      animation: rise 600ms ease;
    }

    header { display: flex; flex-direction: column; gap: 6px; }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    .subtitle { margin: 0; color: #5d6b78; font-size: 1rem; }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 6px;
    }

    .stat span { display: block; }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #7d8894;
    }

    .stat .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .stat .detail { font-size: 0.85rem; color: #7d8894; }
    .stat .detail span { display: inline; }

    .entry {
      background: white;
      border-radius: 20px;
      padding: 20px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 12px;
    }

    .entry h2 { margin: 0; font-size: 1.2rem; }

    textarea {
      width: 100%;
      min-height: 72px;
      resize: vertical;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      padding: 10px 12px;
      font: inherit;
    }

    .entry-controls {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      gap: 12px;
    }

    select {
      border-radius: 10px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      padding: 8px 10px;
      font: inherit;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 22px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
      box-shadow: 0 10px 24px rgba(59, 130, 246, 0.3);
      transition: transform 150ms ease, box-shadow 150ms ease;
    }

    button:active { transform: scale(0.98); }

    .charts {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(300px, 1fr));
      gap: 16px;
    }

    .chart-card {
      background: white;
      border-radius: 20px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 10px;
    }

    .chart-card h2 { margin: 0; font-size: 1.2rem; }

    .chart-card svg { width: 100%; height: 240px; display: block; }
    .chart-card svg text { font-family: "Space Grotesk", "Trebuchet MS", sans-serif; }

    .chart-label { fill: #7a8490; font-size: 11px; }
    .chart-grid { stroke: rgba(47, 72, 88, 0.12); }

    .legend {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      font-size: 0.8rem;
      color: #5d6b78;
    }

    .legend .swatch {
      display: inline-block;
      width: 10px;
      height: 10px;
      border-radius: 3px;
      margin-right: 4px;
    }

    .cal-row {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 6px;
      margin-top: 6px;
    }

    .cal-head {
      font-size: 0.75rem;
      text-transform: uppercase;
      letter-spacing: 0.08em;
      color: #7d8894;
      text-align: center;
    }

    .cal-day {
      aspect-ratio: 1;
      border-radius: 8px;
      display: grid;
      place-items: center;
      font-size: 0.8rem;
      color: #3c4a57;
      background: #eef1f4;
    }

    .cal-day.pad { background: transparent; }
    .cal-day.lvl-1 { background: #bfdbfe; }
    .cal-day.lvl-2 { background: #93c5fd; }
    .cal-day.lvl-3 { background: #60a5fa; }
    .cal-day.lvl-4 { background: #2563eb; color: white; }

    .status { font-size: 0.95rem; color: #5d6b78; min-height: 1.2em; }
    .status[data-type="error"] { color: #c63b2b; }
    .status[data-type="ok"] { color: #2d7a4b; }

    @keyframes rise {
      from { opacity: 0; transform: translateY(18px); }
      to { opacity: 1; transform: translateY(0); }
    }

    @media (max-width: 600px) {
      .app { padding: 28px 22px; }
      button { width: 100%; }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Failure Bank</h1>
      <p class="subtitle">Log what you tried, score it 1-5, watch the bank grow. Today is {{DATE}} (UTC+9).</p>
    </header>

    <section class="panel">
      {{STAT_CARDS}}
    </section>

    <section class="entry">
      <h2>New record</h2>
      <form id="record-form">
        <textarea id="record-content" maxlength="1000" placeholder="What did you challenge today?"></textarea>
        <div class="entry-controls">
          <label for="record-score">Score</label>
          <select id="record-score">
            <option value="1">1</option>
            <option value="2">2</option>
            <option value="3" selected>3</option>
            <option value="4">4</option>
            <option value="5">5</option>
          </select>
          <button type="submit">Save record</button>
        </div>
      </form>
      <div class="status" id="status"></div>
    </section>

    <section class="charts">
      <div class="chart-card">
        <h2>This week</h2>
        <svg id="weekly-chart" viewBox="0 0 420 240" role="img" aria-label="Weekly score chart"></svg>
        <div class="legend" id="weekly-legend"></div>
      </div>
      <div class="chart-card">
        <h2>Score distribution</h2>
        <svg id="distribution-chart" viewBox="0 0 420 240" role="img" aria-label="Score distribution chart"></svg>
      </div>
    </section>

    <section class="chart-card">
      <h2>Activity calendar - {{CALENDAR_TITLE}}</h2>
      <div id="calendar">{{CALENDAR}}</div>
    </section>
  </main>

  <script>
    const statusEl = document.getElementById('status');
    const weeklyChart = document.getElementById('weekly-chart');
    const weeklyLegend = document.getElementById('weekly-legend');
    const distributionChart = document.getElementById('distribution-chart');

    const SCORE_COLORS = {
      1: getComputedStyle(document.documentElement).getPropertyValue('--score-1'),
      2: getComputedStyle(document.documentElement).getPropertyValue('--score-2'),
      3: getComputedStyle(document.documentElement).getPropertyValue('--score-3'),
      4: getComputedStyle(document.documentElement).getPropertyValue('--score-4'),
      5: getComputedStyle(document.documentElement).getPropertyValue('--score-5')
    };
    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const unwrap = async (res) => {
      const body = await res.json();
      if (!res.ok || !body.success) {
        const message = body && body.error ? body.error.message : 'Request failed';
        throw new Error(message);
      }
      return body.data;
    };

    const renderWeekly = (points) => {
      const width = 420;
      const height = 240;
      const paddingX = 36;
      const paddingY = 30;
      const top = 16;

      // Stack per-score counts weighted by score value, like the score cards.
      const totals = points.map((point) =>
        point.score_counts.reduce((acc, count, index) => acc + count * (index + 1), 0)
      );
      const max = Math.max(4, ...totals);
      const slotWidth = (width - paddingX * 2) / points.length;
      const barWidth = slotWidth * 0.6;
      const scaleY = (height - top - paddingY) / max;

      let svg = '';
      const ticks = 4;
      for (let i = 0; i <= ticks; i += 1) {
        const value = (max * i) / ticks;
        const y = height - paddingY - value * scaleY;
        svg += `<line class="chart-grid" x1="${paddingX}" y1="${y}" x2="${width - paddingX}" y2="${y}" />`;
        svg += `<text class="chart-label" x="${paddingX - 8}" y="${y + 4}" text-anchor="end">${Math.round(value)}</text>`;
      }

      points.forEach((point, index) => {
        const x = paddingX + index * slotWidth + (slotWidth - barWidth) / 2;
        let y = height - paddingY;
        point.score_counts.forEach((count, scoreIndex) => {
          const value = count * (scoreIndex + 1);
          if (value > 0) {
            const barHeight = value * scaleY;
            y -= barHeight;
            svg += `<rect x="${x}" y="${y}" width="${barWidth}" height="${barHeight}" rx="2" fill="${SCORE_COLORS[scoreIndex + 1]}" />`;
          }
        });
        svg += `<text class="chart-label" x="${x + barWidth / 2}" y="${height - paddingY + 16}" text-anchor="middle">${point.label}</text>`;
      });

      weeklyChart.innerHTML = svg;
      weeklyLegend.innerHTML = [1, 2, 3, 4, 5]
        .map((score) => `<span><span class="swatch" style="background:${SCORE_COLORS[score]}"></span>Score ${score}</span>`)
        .join('');
    };

    const renderDistribution = (slices) => {
      if (!slices.length) {
        distributionChart.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No records yet</text>';
        return;
      }

      const width = 420;
      const height = 240;
      const paddingX = 70;
      const rowHeight = height / (slices.length + 1);
      const maxCount = Math.max(...slices.map((slice) => slice.count));
      const barMax = width - paddingX - 80;

      let svg = '';
      slices.forEach((slice, index) => {
        const y = rowHeight * (index + 0.6);
        const barWidth = maxCount > 0 ? (slice.count / maxCount) * barMax : 0;
        svg += `<text class="chart-label" x="${paddingX - 10}" y="${y + 4}" text-anchor="end">Score ${slice.score}</text>`;
        svg += `<rect x="${paddingX}" y="${y - 8}" width="${Math.max(barWidth, 2)}" height="16" rx="4" fill="${SCORE_COLORS[slice.score]}" />`;
        svg += `<text class="chart-label" x="${paddingX + Math.max(barWidth, 2) + 8}" y="${y + 4}">${slice.count} (${Math.round(slice.percentage)}%)</text>`;
      });

      distributionChart.innerHTML = svg;
    };

    const updateSummaryCards = (summary) => {
      const cards = { today: summary.today, week: summary.this_week, month: summary.this_month, all: summary.all_time };
      Object.entries(cards).forEach(([key, stats]) => {
        document.getElementById(`${key}-total`).textContent = stats.total_score;
        document.getElementById(`${key}-count`).textContent = stats.record_count;
        document.getElementById(`${key}-avg`).textContent = stats.average_score.toFixed(1);
      });
    };

    // Independent fetches into disjoint views; each recomputes its view
    // entirely from its own latest payload.
    const refresh = async () => {
      const [summary, weekly, dist] = await Promise.all([
        fetch('/api/stats/summary').then(unwrap),
        fetch('/api/stats/weekly').then(unwrap),
        fetch('/api/stats/distribution').then(unwrap)
      ]);
      updateSummaryCards(summary);
      renderWeekly(weekly);
      renderDistribution(dist);
    };

    document.getElementById('record-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const content = document.getElementById('record-content').value;
      const score = Number(document.getElementById('record-score').value);
      setStatus('Saving...', 'info');
      fetch('/api/records', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ content, score })
      })
        .then(unwrap)
        .then(() => {
          document.getElementById('record-content').value = '';
          setStatus('Saved', 'ok');
          setTimeout(() => setStatus('', ''), 1200);
          // Calendar is server-rendered; a reload refreshes it with the rest.
          window.location.reload();
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    refresh().catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;

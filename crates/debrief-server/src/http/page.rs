/// Single-page front end served at `/`.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Debrief</title>
<style>
  * { box-sizing: border-box; }
  body { margin: 0; font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif; background: #0f1117; color: #e6e6e6; }
  header { padding: 16px 24px; border-bottom: 1px solid #222; display: flex; justify-content: space-between; align-items: center; }
  header h1 { margin: 0; font-size: 20px; }
  main { display: grid; grid-template-columns: 260px 1fr; min-height: calc(100vh - 60px); }
  aside { border-right: 1px solid #222; padding: 16px; }
  aside h2 { font-size: 13px; text-transform: uppercase; color: #888; }
  aside ul { list-style: none; padding: 0; margin: 0; }
  aside li { padding: 8px; border-radius: 6px; cursor: pointer; }
  aside li:hover, aside li.active { background: #1c1f2a; }
  aside li small { display: block; color: #888; }
  section { padding: 24px; max-width: 960px; }
  textarea, input[type=text] { width: 100%; background: #161923; color: #e6e6e6; border: 1px solid #2a2e3b; border-radius: 6px; padding: 8px; margin-bottom: 12px; }
  textarea { min-height: 100px; }
  button { background: #4f7cff; color: white; border: 0; border-radius: 6px; padding: 10px 18px; cursor: pointer; }
  button.secondary { background: #2a2e3b; }
  button:disabled { opacity: 0.5; cursor: default; }
  .files li { display: flex; justify-content: space-between; padding: 4px 0; }
  .bar { height: 8px; background: #222; border-radius: 4px; overflow: hidden; margin: 16px 0; }
  .bar div { height: 100%; background: #4f7cff; width: 0; transition: width 0.3s; }
  .card { background: #161923; border: 1px solid #2a2e3b; border-radius: 8px; padding: 16px; margin-bottom: 16px; }
  .card h3 { margin-top: 0; }
  .meta span { margin-right: 16px; color: #aaa; }
  .hidden { display: none; }
  .advisory { color: #f0b429; }
</style>
</head>
<body>
<header>
  <h1>Debrief</h1>
  <button class="secondary" id="new-btn">New analysis</button>
</header>
<main>
  <aside>
    <h2>History</h2>
    <ul id="history"></ul>
  </aside>
  <section>
    <div id="upload">
      <label>Meeting notes or transcript</label>
      <textarea id="notes"></textarea>
      <label>Slide text</label>
      <textarea id="slides"></textarea>
      <label>Context</label>
      <input type="text" id="context" placeholder="Who was there, what was at stake">
      <input type="file" id="file-input" multiple>
      <ul class="files" id="files"></ul>
      <p class="advisory" id="advisories"></p>
      <button id="analyze-btn">Analyze</button>
    </div>
    <div id="progress" class="hidden">
      <p>Analyzing...</p>
      <div class="bar"><div id="bar"></div></div>
      <button class="secondary" id="cancel-btn">Cancel</button>
    </div>
    <div id="report" class="hidden"></div>
  </section>
</main>
<script>
const state = { files: [], sessionId: null, source: null };
const $ = (id) => document.getElementById(id);

function esc(s) {
  return String(s ?? '').replace(/[&<>"']/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'}[c]));
}

function show(view) {
  for (const id of ['upload', 'progress', 'report']) $(id).classList.toggle('hidden', id !== view);
}

function renderFiles() {
  $('files').innerHTML = state.files.map((f, i) =>
    `<li><span>${esc(f.name)}</span><button class="secondary" data-i="${i}">Remove</button></li>`).join('');
  $('files').querySelectorAll('button').forEach(b => b.onclick = () => {
    state.files.splice(Number(b.dataset.i), 1);
    renderFiles();
  });
}

$('file-input').onchange = (e) => {
  for (const file of e.target.files) {
    const reader = new FileReader();
    reader.onload = () => {
      state.files.push({ name: file.name, mediaType: file.type, payload: reader.result });
      renderFiles();
    };
    reader.readAsDataURL(file);
  }
  e.target.value = '';
};

async function loadHistory(activeId) {
  const resp = await fetch('/reports');
  const json = await resp.json();
  const reports = json.data || [];
  $('history').innerHTML = reports.map(r =>
    `<li data-id="${r.id}" class="${r.id === activeId ? 'active' : ''}">${esc(r.title)}<small>${esc(r.date)}</small></li>`).join('');
  $('history').querySelectorAll('li').forEach(li => li.onclick = () => openReport(li.dataset.id));
}

async function openReport(id) {
  const resp = await fetch(`/reports/${id}`);
  const json = await resp.json();
  if (!json.success) { alert(json.error); return; }
  renderReport(json.data);
  loadHistory(id);
}

function list(items, fn) {
  return '<ul>' + (items || []).map(fn).join('') + '</ul>';
}

function renderReport(r) {
  const s = r.summary || {}, si = r.strategicIntelligence || {}, ri = r.riskIdentification || {}, tp = r.talkingPoints || {};
  $('report').innerHTML = `
    <h2>${esc(r.title)}</h2>
    <div class="meta"><span>${esc(r.date)}</span><span>${esc(r.meetingType)}</span>
      <span>Confidence ${Math.round(r.confidenceScore || 0)}</span><span>${esc(r.sentiment)}</span><span>${esc(r.focusArea)}</span></div>
    <div class="card"><h3>Executive Brief</h3><p>${esc(r.executiveBrief)}</p></div>
    <div class="card"><h3>Summary</h3><p>${esc(s.overview)}</p>
      <h4>Key discussion</h4><p>${esc(s.keyDiscussion)}</p>
      <h4>Decisions</h4><p>${esc(s.decisionsMade)}</p>
      <p><b>Outcome:</b> ${esc(s.outcome)}</p></div>
    <div class="card"><h3>Strategic Intelligence</h3>
      ${list(si.stakeholders, x => `<li>${esc(x.role)}: ${esc(x.sentiment)}</li>`)}
      <p>${esc(si.powerDynamics)}</p><p>${esc(si.underlyingMotivations)}</p></div>
    <div class="card"><h3>Risks</h3>
      ${list(ri.risks, x => `<li><b>${esc(x.severity)}</b> ${esc(x.type)}: ${esc(x.description)}</li>`)}
      <p><b>Hidden objection:</b> ${esc(ri.hiddenObjection)}</p></div>
    <div class="card"><h3>Talking Points</h3>
      ${list(tp.points, x => `<li><b>${esc(x.title)}</b> ${esc(x.description)}</li>`)}
      <p>${esc(tp.framingStrategy)}</p></div>
    <div class="card"><h3>Objection Handling</h3>
      ${list(r.objections, x => `<li><b>${esc(x.objection)}</b> ${esc(x.response)}</li>`)}</div>
    <div class="card"><h3>Next Steps</h3>
      ${list(r.nextSteps, x => `<li>[${esc(x.status)}] ${esc(x.action)} (${esc(x.owner)}, ${esc(x.timeline)})</li>`)}</div>
    <div class="card"><h3>Image Prompt</h3><p>${esc(r.imagePrompt)}</p></div>`;
  show('report');
}

function resetInput() {
  state.files = []; renderFiles();
  $('notes').value = ''; $('slides').value = ''; $('context').value = '';
}

function cancelSession() {
  if (state.source) { state.source.close(); state.source = null; }
  if (state.sessionId) {
    fetch(`/sessions/${state.sessionId}`, { method: 'DELETE', keepalive: true });
    state.sessionId = null;
  }
}

$('analyze-btn').onclick = async () => {
  const body = {
    notes: $('notes').value,
    slidesText: $('slides').value,
    context: $('context').value,
    files: state.files,
  };
  const resp = await fetch('/sessions', {
    method: 'POST', headers: { 'content-type': 'application/json' }, body: JSON.stringify(body),
  });
  const json = await resp.json();
  if (!json.success) { alert(json.error); return; }
  $('advisories').textContent = (json.data.advisories || []).join(' ');
  state.sessionId = json.data.sessionId;
  $('bar').style.width = '0%';
  show('progress');

  state.source = new EventSource(`/sessions/${state.sessionId}/events`);
  state.source.addEventListener('status', (e) => {
    const s = JSON.parse(e.data);
    if (s.state === 'running') { $('bar').style.width = `${s.progress}%`; return; }
    state.source.close(); state.source = null; state.sessionId = null;
    resetInput();
    if (s.state === 'completed') {
      $('bar').style.width = '100%';
      openReport(s.reportId);
      return;
    }
    if (s.state === 'failed') alert(s.message);
    show('upload');
  });
};

$('cancel-btn').onclick = () => { cancelSession(); resetInput(); show('upload'); };
$('new-btn').onclick = () => { cancelSession(); show('upload'); loadHistory(); };
window.addEventListener('beforeunload', cancelSession);

loadHistory().then(() => {
  const first = document.querySelector('#history li');
  if (first) openReport(first.dataset.id);
});
</script>
</body>
</html>
"##;

//! Localhost web chat UI (raw tokio TCP + embedded HTML).
//!
//! One engine instance is shared across connections; the engine's own
//! `Busy` rejection is what keeps two tabs from racing a resolution.
//! Routes: `/` (chat page), `/chat?message=...` (submit, JSON reply),
//! `/history` (JSON transcript), `/answer?value=...` (draft answer).

use std::sync::Arc;

use colored::*;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use crate::error::RejectReason;
use crate::{ConversationEngine, Role};

/// Embedded single-page chat application.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Ask Jojo</title>
<style>
*{margin:0;padding:0;box-sizing:border-box}
body{background:#0d1117;color:#c9d1d9;font-family:'Cascadia Code','Fira Code',monospace;min-height:100vh;display:flex;flex-direction:column}
header{padding:14px 24px;border-bottom:1px solid #21262d;display:flex;align-items:center;gap:12px;background:linear-gradient(90deg,#2d1b4e,#21114a)}
.avatar{width:36px;height:36px;border-radius:50%;background:#fff;color:#7c3aed;display:flex;align-items:center;justify-content:center;font-weight:bold;font-size:1.1rem}
header h1{font-size:1.1rem;color:#d8b4fe}
header p{font-size:.75rem;color:#8b949e}
#question{padding:14px 24px;border-bottom:1px solid #21262d;background:#161b22;font-size:.9rem;line-height:1.6}
#question .qid{font-size:.7rem;color:#8b949e;font-family:inherit;float:right}
.quick{display:flex;gap:8px;padding:10px 24px;border-bottom:1px solid #21262d;background:#10141a}
.quick button{background:#21262d;border:1px solid #30363d;color:#c9d1d9;padding:6px 14px;border-radius:999px;font-family:inherit;font-size:.8rem;cursor:pointer}
.quick button:hover{border-color:#7c3aed}
.quick button:disabled{opacity:.4;cursor:not-allowed}
#messages{flex:1;overflow-y:auto;padding:16px 24px;display:flex;flex-direction:column;gap:10px}
.msg{max-width:80%;padding:10px 14px;border-radius:14px;font-size:.88rem;line-height:1.55;white-space:pre-wrap;word-wrap:break-word}
.msg.user{align-self:flex-end;background:#0b4a6f;border-bottom-right-radius:4px}
.msg.assistant{align-self:flex-start;background:#1c2333;border-bottom-left-radius:4px}
.msg .math{color:#79c0ff;font-style:italic}
.msg .math.block{display:block;text-align:center;margin:8px 0;color:#a5d6ff}
#thinking{align-self:flex-start;color:#8b949e;font-size:.8rem;display:none;padding:4px 14px}
#thinking.show{display:block}
.inputbar{display:flex;gap:8px;padding:12px 24px;border-top:1px solid #21262d;background:#161b22}
.inputbar input{flex:1;background:#0d1117;border:1px solid #30363d;color:#c9d1d9;padding:10px 14px;border-radius:999px;font-family:inherit;font-size:.88rem}
.inputbar input:focus{outline:none;border-color:#7c3aed}
.inputbar button{background:#7c3aed;border:none;color:#fff;padding:10px 22px;border-radius:999px;font-family:inherit;font-size:.88rem;cursor:pointer}
.inputbar button:hover{background:#8b5cf6}
.inputbar button:disabled,.inputbar input:disabled{opacity:.5;cursor:not-allowed}
#error{padding:4px 24px;color:#f85149;font-size:.75rem;min-height:1.2em}
</style>
</head>
<body>
<header>
  <div class="avatar">J</div>
  <div>
    <h1>Ask Jojo</h1>
    <p>Your AI tutor</p>
  </div>
</header>
<div id="question"></div>
<div class="quick">
  <button id="qa-hint">&#128161; Give me a hint</button>
  <button id="qa-steps">&#128221; Reveal the steps</button>
</div>
<div id="messages"></div>
<div id="thinking">Jojo is thinking&hellip;</div>
<div id="error"></div>
<div class="inputbar">
  <input type="text" id="input" placeholder="Ask Jojo anything..." autocomplete="off">
  <button id="send">Send</button>
</div>
<script>
const $=s=>document.querySelector(s);
const mathSplit=/(\$\$[\s\S]*?\$\$|\$[^$]*?\$)/g;
function renderMath(text,into){
  for(const part of text.split(mathSplit)){
    if(!part)continue;
    const span=document.createElement('span');
    if(part.startsWith('$$')&&part.endsWith('$$')&&part.length>=4){
      span.className='math block';span.textContent=part.slice(2,-2).trim();
    }else if(part.startsWith('$')&&part.endsWith('$')&&part.length>=2){
      span.className='math';span.textContent=part.slice(1,-1).trim();
    }else{
      span.textContent=part;
    }
    into.appendChild(span);
  }
}
function addMsg(role,text){
  const div=document.createElement('div');
  div.className='msg '+role;
  renderMath(text,div);
  $('#messages').appendChild(div);
  $('#messages').scrollTop=$('#messages').scrollHeight;
}
function setBusy(busy){
  for(const id of['#input','#send','#qa-hint','#qa-steps'])$(id).disabled=busy;
  $('#thinking').classList.toggle('show',busy);
}
async function send(text){
  if(!text.trim())return;
  $('#error').textContent='';
  addMsg('user',text.trim());
  $('#input').value='';
  setBusy(true);
  try{
    const res=await fetch('/chat?message='+encodeURIComponent(text));
    const body=await res.json();
    if(res.ok){addMsg('assistant',body.message)}
    else{$('#error').textContent=body.error||('HTTP '+res.status)}
  }catch(e){
    $('#error').textContent='Connection lost. Is the server still running?';
  }
  setBusy(false);
  $('#input').focus();
}
$('#send').onclick=()=>send($('#input').value);
$('#input').addEventListener('keypress',e=>{if(e.key==='Enter')send($('#input').value)});
$('#qa-hint').onclick=()=>send('Give me a hint');
$('#qa-steps').onclick=()=>send('Reveal the steps');
fetch('/history').then(r=>r.json()).then(turns=>{
  for(const t of turns)addMsg(t.role,t.content);
});
fetch('/question').then(r=>r.json()).then(q=>{
  const el=$('#question');
  const id=document.createElement('span');id.className='qid';id.textContent=q.id;
  el.appendChild(id);
  renderMath(q.text,el);
});
</script>
</body>
</html>"##;

/// Simple percent-decoding for URL query parameters.
pub fn url_decode(s: &str) -> String {
    let mut bytes = Vec::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '+' => bytes.push(b' '),
            '%' => {
                let hex: String = chars.by_ref().take(2).collect();
                if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                    bytes.push(byte);
                }
            }
            _ => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Parse a query string into key-value pairs.
pub fn parse_query(query: &str) -> std::collections::HashMap<String, String> {
    query
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?;
            let val = parts.next().unwrap_or("");
            Some((key.to_string(), url_decode(val)))
        })
        .collect()
}

fn http_response(status: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: {}; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body,
    )
}

fn json_error(status: &str, message: &str) -> String {
    let body = serde_json::json!({ "error": message }).to_string();
    http_response(status, "application/json", &body)
}

/// Start the chat UI server on localhost.
pub async fn serve(
    port: u16,
    engine: Arc<ConversationEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    eprintln!(
        "{}",
        format!("  Ask Jojo running at http://localhost:{}", port).bright_green()
    );
    eprintln!("{}", "  Press Ctrl+C to stop.".bright_blue());

    loop {
        let (stream, _addr) = listener.accept().await?;
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, engine).await {
                eprintln!("  connection error: {}", e);
            }
        });
    }
}

async fn handle_connection(
    mut stream: tokio::net::TcpStream,
    engine: Arc<ConversationEngine>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tokio::io::AsyncReadExt;

    let mut buf = vec![0u8; 8192];
    let n = stream.read(&mut buf).await?;
    let request = String::from_utf8_lossy(&buf[..n]);

    // Parse the request line: "GET /path?query HTTP/1.1"
    let first_line = request.lines().next().unwrap_or("");
    let parts: Vec<&str> = first_line.split_whitespace().collect();
    if parts.len() < 2 {
        return Ok(());
    }
    let path_and_query = parts[1];

    let (path, query_str) = match path_and_query.find('?') {
        Some(idx) => (&path_and_query[..idx], &path_and_query[idx + 1..]),
        None => (path_and_query, ""),
    };

    let response = match path {
        "/" => http_response("200 OK", "text/html", INDEX_HTML),
        "/question" => {
            let body = serde_json::to_string(engine.question())?;
            http_response("200 OK", "application/json", &body)
        }
        "/history" => {
            let body = serde_json::to_string(&engine.history())?;
            http_response("200 OK", "application/json", &body)
        }
        "/answer" => {
            let params = parse_query(query_str);
            let value = params.get("value").cloned().unwrap_or_default();
            let answer = if value.trim().is_empty() { None } else { Some(value) };
            engine.set_student_answer(answer);
            http_response("200 OK", "application/json", "{\"ok\":true}")
        }
        "/chat" => {
            let params = parse_query(query_str);
            let message = params.get("message").cloned().unwrap_or_default();
            match engine.submit(&message).await {
                Ok(()) => {
                    let reply = engine
                        .history()
                        .iter()
                        .rev()
                        .find(|t| t.role == Role::Assistant)
                        .map(|t| t.content.clone())
                        .unwrap_or_default();
                    let body = serde_json::json!({ "message": reply }).to_string();
                    http_response("200 OK", "application/json", &body)
                }
                Err(RejectReason::EmptyInput) => {
                    json_error("400 Bad Request", &RejectReason::EmptyInput.to_string())
                }
                Err(RejectReason::Busy) => {
                    json_error("409 Conflict", &RejectReason::Busy.to_string())
                }
            }
        }
        _ => http_response("404 Not Found", "text/plain", "Not Found"),
    };

    stream.write_all(response.as_bytes()).await?;
    Ok(())
}

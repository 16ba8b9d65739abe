//! Text and HTML views of a [`RagResponse`].
use std::fmt::Write;

use lexrag_core::RagResponse;

pub const QUESTION_PROMPT: &str = "请输入您的法律问题：";

pub fn console(response: &RagResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "基于参考文献的回答:{}", response.answer);
    let _ = writeln!(out, "参考文献:");
    for c in &response.citations {
        let _ = writeln!(out, "文件: {}, 条目: {}", c.source_id, c.text);
    }
    out
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"zh\">\n\
         <head><meta charset=\"utf-8\"><title>法律问答</title></head>\n\
         <body>\n{body}</body>\n</html>\n"
    )
}

fn form(query: &str) -> String {
    format!(
        "<h1>法律问答</h1>\n<form method=\"post\" action=\"/ask\">\n\
         <label for=\"query\">{QUESTION_PROMPT}</label>\n\
         <input type=\"text\" id=\"query\" name=\"query\" size=\"60\" value=\"{}\">\n\
         <button type=\"submit\">提交</button>\n</form>\n",
        escape_html(query)
    )
}

pub fn form_page() -> String {
    page(&form(""))
}

pub fn answer_page(query: &str, response: &RagResponse) -> String {
    let mut body = form(query);
    let _ = writeln!(
        body,
        "<h2>基于参考文献的回答</h2>\n<p>{}</p>",
        escape_html(&response.answer)
    );
    let _ = writeln!(body, "<h2>参考文献</h2>\n<ul>");
    for c in &response.citations {
        let _ = writeln!(
            body,
            "<li><b>文件:</b> {} <b>条目:</b> {}</li>",
            escape_html(&c.source_id),
            escape_html(&c.text)
        );
    }
    body.push_str("</ul>\n");
    page(&body)
}

pub fn error_page(query: &str, message: &str) -> String {
    let mut body = form(query);
    let _ = writeln!(body, "<p class=\"error\">{}</p>", escape_html(message));
    page(&body)
}

//! Inline HTML pages.

use rust_decimal::Decimal;

use crate::types::user::AccountSummary;

/// Quote search outcome shown on the dashboard.
pub enum QuoteView {
    Found { symbol: String, price: Decimal },
    NotFound { symbol: String },
    Unavailable { symbol: String },
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n{body}\n</body></html>\n"
    )
}

fn notice(message: Option<&str>) -> String {
    message
        .map(|m| format!("<p class=\"notice\">{}</p>\n", escape(m)))
        .unwrap_or_default()
}

pub fn signup_page(message: Option<&str>) -> String {
    page(
        "Sign up",
        &format!(
            "<h1>Sign up</h1>\n{}<form method=\"post\" action=\"/signup\">\n\
             <input type=\"email\" name=\"email\" placeholder=\"Email\" required>\n\
             <input type=\"password\" name=\"password\" placeholder=\"Password\" required>\n\
             <button type=\"submit\">Create account</button>\n</form>\n\
             <p><a href=\"/login\">Log in</a></p>",
            notice(message)
        ),
    )
}

pub fn login_page(message: Option<&str>) -> String {
    page(
        "Log in",
        &format!(
            "<h1>Log in</h1>\n{}<form method=\"post\" action=\"/login\">\n\
             <input type=\"email\" name=\"email\" placeholder=\"Email\" required>\n\
             <input type=\"password\" name=\"password\" placeholder=\"Password\" required>\n\
             <button type=\"submit\">Log in</button>\n</form>\n\
             <p><a href=\"/signup\">Sign up</a></p>",
            notice(message)
        ),
    )
}

pub fn dashboard_page(
    account: &AccountSummary,
    currency: &str,
    quote: Option<&QuoteView>,
) -> String {
    let currency = escape(currency);
    let mut body = format!(
        "<h1>Dashboard</h1>\n<p>Logged in as {} | <a href=\"/logout\">Log out</a></p>\n\
         <p class=\"balance\">Balance: {currency}{}</p>\n",
        escape(&account.email),
        account.balance
    );

    body.push_str(
        "<form method=\"post\" action=\"/dashboard\">\n\
         <input type=\"text\" name=\"symbol\" placeholder=\"Symbol\" required>\n\
         <button type=\"submit\" name=\"search\" value=\"1\">Search</button>\n</form>\n",
    );

    match quote {
        Some(QuoteView::Found { symbol, price }) => {
            let symbol = escape(symbol);
            body.push_str(&format!(
                "<div class=\"quote\"><p>{symbol}: {currency}{price}</p>\n\
                 <form method=\"post\" action=\"/buy\">\n\
                 <input type=\"hidden\" name=\"symbol\" value=\"{symbol}\">\n\
                 <input type=\"number\" name=\"shares\" min=\"1\" step=\"1\" placeholder=\"Shares\" required>\n\
                 <input type=\"number\" name=\"stop_loss\" min=\"0\" step=\"any\" placeholder=\"Stop-loss\" required>\n\
                 <button type=\"submit\">Buy</button>\n</form></div>\n"
            ));
        }
        Some(QuoteView::NotFound { symbol }) => {
            body.push_str(&format!(
                "<p class=\"quote\">No quote found for {}.</p>\n",
                escape(symbol)
            ));
        }
        Some(QuoteView::Unavailable { symbol }) => {
            body.push_str(&format!(
                "<p class=\"quote\">Quote service unavailable for {}. Try again later.</p>\n",
                escape(symbol)
            ));
        }
        None => {}
    }

    body.push_str("<h2>Portfolio</h2>\n");
    if account.portfolio.is_empty() {
        body.push_str("<p>No holdings yet.</p>\n");
    } else {
        body.push_str("<table>\n<tr><th>Symbol</th><th>Shares</th><th>Price</th><th>Stop-loss</th></tr>\n");
        for (symbol, holding) in &account.portfolio {
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{currency}{}</td><td>{currency}{}</td></tr>\n",
                escape(symbol),
                holding.shares,
                holding.price,
                holding.stop_loss
            ));
        }
        body.push_str("</table>\n");
    }

    body.push_str("<h2>Transactions</h2>\n");
    if account.transactions.is_empty() {
        body.push_str("<p>No transactions yet.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for line in &account.transactions {
            body.push_str(&format!("<li>{}</li>\n", escape(line)));
        }
        body.push_str("</ul>\n");
    }

    page("Dashboard", &body)
}

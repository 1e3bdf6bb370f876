//! Server-rendered HTML.
//!
//! Every interpolated value goes through [`escape_html`]. Access tokens are
//! never passed in here.

use std::fmt::Write;

use crate::catalog::Product;
use crate::config::ShopDomain;

const STYLE: &str = "body{font-family:sans-serif;margin:0;background:#f6f6f7}\
.container{max-width:1200px;margin:auto;padding:20px}\
h1{text-align:center;color:#333}\
.grid{display:grid;grid-template-columns:repeat(auto-fit,minmax(300px,1fr));gap:20px}\
.card{background:#fff;border-radius:10px;box-shadow:0 4px 8px rgba(0,0,0,.1);overflow:hidden}\
.card img{width:100%;height:200px;object-fit:cover}\
.card-content{padding:15px}\
.info{font-size:.9rem;color:#555;margin:3px 0}\
.error{text-align:center;color:red;padding:20px}\
.empty{text-align:center}";

/// Escapes text for use in HTML element content and quoted attributes.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <div class=\"container\">\n{body}</div>\n</body>\n</html>\n",
        escape_html(title)
    )
}

/// The landing page with the install form.
#[must_use]
pub fn index_page() -> String {
    layout(
        "Install",
        "<h1>Install the app</h1>\n\
         <form action=\"/auth\" method=\"get\">\n\
         <label for=\"shop\">Shop domain</label>\n\
         <input id=\"shop\" name=\"shop\" placeholder=\"your-store.myshopify.com\" required>\n\
         <button type=\"submit\">Install</button>\n\
         </form>\n",
    )
}

/// The product grid for `shop`.
#[must_use]
pub fn products_page(shop: &ShopDomain, products: &[Product]) -> String {
    let title = format!("Products for {shop}");
    let mut body = format!("<h1>{}</h1>\n", escape_html(&title));

    if products.is_empty() {
        body.push_str("<p class=\"empty\">No products found.</p>\n");
        return layout(&title, &body);
    }

    body.push_str("<div class=\"grid\">\n");
    for product in products {
        let name = escape_html(&product.title);
        body.push_str("<div class=\"card\">\n");
        if let Some(image) = &product.image {
            let alt = image
                .alt
                .as_deref()
                .filter(|alt| !alt.is_empty())
                .map_or_else(|| name.clone(), escape_html);
            let _ = writeln!(
                body,
                "<img src=\"{}\" alt=\"{alt}\">",
                escape_html(&image.src)
            );
        }
        let _ = write!(
            body,
            "<div class=\"card-content\">\n<h2>{name}</h2>\n\
             <p class=\"info\"><strong>ID:</strong> {}</p>\n\
             <p class=\"info\"><strong>Type:</strong> {}</p>\n\
             <p class=\"info\"><strong>Vendor:</strong> {}</p>\n</div>\n</div>\n",
            product.id,
            escape_html(&product.product_type),
            escape_html(&product.vendor),
        );
    }
    body.push_str("</div>\n");

    layout(&title, &body)
}

/// The products page when the catalog could not be loaded.
#[must_use]
pub fn products_error_page(shop: &ShopDomain, message: &str) -> String {
    let title = format!("Products for {shop}");
    layout(
        &title,
        &format!(
            "<h1>{}</h1>\n<p class=\"error\">{}</p>\n",
            escape_html(&title),
            escape_html(message)
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductImage;

    fn shop() -> ShopDomain {
        ShopDomain::new("test-store.myshopify.com").unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_products_page_escapes_product_fields() {
        let products = vec![Product {
            id: 7,
            title: "<script>alert(1)</script>".to_string(),
            product_type: "Toys".to_string(),
            vendor: "Acme & Co".to_string(),
            image: Some(ProductImage {
                src: "https://cdn.example.com/x.png".to_string(),
                alt: None,
            }),
        }];

        let html = products_page(&shop(), &products);

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("Acme &amp; Co"));
        assert!(html.contains("alt=\"&lt;script&gt;"));
        assert!(html.contains("Products for test-store.myshopify.com"));
    }

    #[test]
    fn test_products_page_without_products() {
        let html = products_page(&shop(), &[]);
        assert!(html.contains("No products found."));
    }

    #[test]
    fn test_index_page_posts_shop_to_auth() {
        let html = index_page();
        assert!(html.contains("action=\"/auth\""));
        assert!(html.contains("name=\"shop\""));
    }
}

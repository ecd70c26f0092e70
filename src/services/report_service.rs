// src/services/report_service.rs

use std::collections::{BTreeMap, HashSet};

use genpdf::{Alignment, Element, elements, style};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::{AppError, display_amount},
    db::ReportRepository,
    models::{
        product::ProductStatus,
        report::{
            CategoryBucket, InventoryReport, ProductReportRow, ReportFilters, StatusBucket,
            VendorBucket,
        },
    },
};

const RECENT_PRODUCTS: usize = 10;
const UNKNOWN_VENDOR: &str = "Unknown vendor";

#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    fonts_dir: String,
}

/// Groups the matching products into the report buckets. Buckets come out
/// sorted by their key; vendors sharing a name stay separate buckets.
/// Recent products are the newest first.
pub fn build_report(rows: Vec<ProductReportRow>) -> Result<InventoryReport, AppError> {
    let mut total_value = Decimal::ZERO;
    let mut vendor_ids = HashSet::new();
    let mut by_category: BTreeMap<String, (usize, Decimal)> = BTreeMap::new();
    let mut by_vendor: BTreeMap<(String, Uuid), (usize, Decimal)> = BTreeMap::new();
    let mut by_status: BTreeMap<&'static str, (ProductStatus, usize)> = BTreeMap::new();

    for row in &rows {
        let product = &row.product;
        let value = product
            .price
            .checked_mul(Decimal::from(product.stock))
            .ok_or_else(value_out_of_range)?;
        total_value = add_value(total_value, value)?;
        vendor_ids.insert(product.vendor_id);

        let category = by_category.entry(product.category.clone()).or_default();
        category.0 += 1;
        category.1 = add_value(category.1, value)?;

        let vendor_name = row.vendor_name.clone().unwrap_or_else(|| UNKNOWN_VENDOR.to_string());
        let vendor = by_vendor.entry((vendor_name, product.vendor_id)).or_default();
        vendor.0 += 1;
        vendor.1 = add_value(vendor.1, value)?;

        by_status
            .entry(product.status.as_str())
            .or_insert((product.status, 0))
            .1 += 1;
    }

    let total_products = rows.len();
    let mut recent: Vec<_> = rows.into_iter().map(|r| r.product).collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(RECENT_PRODUCTS);

    Ok(InventoryReport {
        total_products,
        total_vendors: vendor_ids.len(),
        total_value,
        products_by_category: by_category
            .into_iter()
            .map(|(category, (count, value))| CategoryBucket { category, count, value })
            .collect(),
        products_by_vendor: by_vendor
            .into_iter()
            .map(|((vendor_name, vendor_id), (count, value))| VendorBucket {
                vendor_id,
                vendor_name,
                count,
                value,
            })
            .collect(),
        products_by_status: by_status
            .into_values()
            .map(|(status, count)| StatusBucket { status, count })
            .collect(),
        recent_products: recent,
    })
}

fn value_out_of_range() -> AppError {
    AppError::ReportRender("Inventory value is out of range".into())
}

fn add_value(acc: Decimal, value: Decimal) -> Result<Decimal, AppError> {
    acc.checked_add(value).ok_or_else(value_out_of_range)
}

fn render_error(e: genpdf::error::Error) -> AppError {
    AppError::ReportRender(e.to_string())
}

impl ReportService {
    pub fn new(report_repo: ReportRepository, fonts_dir: String) -> Self {
        Self {
            report_repo,
            fonts_dir,
        }
    }

    pub async fn inventory_report(&self, filters: &ReportFilters) -> Result<InventoryReport, AppError> {
        let rows = self.report_repo.products(filters).await?;
        build_report(rows)
    }

    pub async fn inventory_report_pdf(&self, filters: &ReportFilters) -> Result<Vec<u8>, AppError> {
        let report = self.inventory_report(filters).await?;
        render_report_pdf(&self.fonts_dir, &report, filters)
    }
}

pub fn render_report_pdf(
    fonts_dir: &str,
    report: &InventoryReport,
    filters: &ReportFilters,
) -> Result<Vec<u8>, AppError> {
    // 1. Document setup
    let font_family = genpdf::fonts::from_files(fonts_dir, "Roboto", None)
        .map_err(|_| AppError::FontNotFound(format!("Roboto family not found in {}", fonts_dir)))?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title("Inventory report");
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    let bold = style::Style::new().bold();

    // --- Header ---
    doc.push(
        elements::Paragraph::new("INVENTORY REPORT")
            .styled(style::Style::new().bold().with_font_size(18)),
    );
    doc.push(elements::Paragraph::new(format!(
        "Generated: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M")
    )));
    for line in filters.describe() {
        doc.push(elements::Paragraph::new(line).styled(style::Style::new().with_font_size(9)));
    }
    doc.push(elements::Break::new(1.5));

    // --- Summary ---
    let mut summary = elements::TableLayout::new(vec![3, 2]);
    summary.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
    for (label, value) in [
        ("Total products", report.total_products.to_string()),
        ("Total vendors", report.total_vendors.to_string()),
        ("Total value", format!("$ {}", display_amount(report.total_value))),
    ] {
        summary
            .row()
            .element(elements::Paragraph::new(label).styled(bold))
            .element(elements::Paragraph::new(value))
            .push()
            .map_err(render_error)?;
    }
    doc.push(summary);
    doc.push(elements::Break::new(1.5));

    // --- By category ---
    doc.push(section_title("By category"));
    let mut categories = bucket_table(["Category", "Products", "Value"], bold)?;
    for bucket in &report.products_by_category {
        categories
            .row()
            .element(elements::Paragraph::new(bucket.category.as_str()))
            .element(elements::Paragraph::new(bucket.count.to_string()))
            .element(money_cell(bucket.value))
            .push()
            .map_err(render_error)?;
    }
    doc.push(categories);
    doc.push(elements::Break::new(1.5));

    // --- By vendor ---
    doc.push(section_title("By vendor"));
    let mut vendors = bucket_table(["Vendor", "Products", "Value"], bold)?;
    for bucket in &report.products_by_vendor {
        vendors
            .row()
            .element(elements::Paragraph::new(bucket.vendor_name.as_str()))
            .element(elements::Paragraph::new(bucket.count.to_string()))
            .element(money_cell(bucket.value))
            .push()
            .map_err(render_error)?;
    }
    doc.push(vendors);
    doc.push(elements::Break::new(1.5));

    // --- By status ---
    doc.push(section_title("By status"));
    let mut statuses = elements::TableLayout::new(vec![3, 1]);
    statuses.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
    statuses
        .row()
        .element(elements::Paragraph::new("Status").styled(bold))
        .element(elements::Paragraph::new("Products").styled(bold))
        .push()
        .map_err(render_error)?;
    for bucket in &report.products_by_status {
        statuses
            .row()
            .element(elements::Paragraph::new(bucket.status.as_str()))
            .element(elements::Paragraph::new(bucket.count.to_string()))
            .push()
            .map_err(render_error)?;
    }
    doc.push(statuses);
    doc.push(elements::Break::new(1.5));

    // --- Recent products ---
    doc.push(section_title("Recent products"));
    let mut recent = elements::TableLayout::new(vec![4, 2, 1, 2]);
    recent.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
    recent
        .row()
        .element(elements::Paragraph::new("Product").styled(bold))
        .element(elements::Paragraph::new("SKU").styled(bold))
        .element(elements::Paragraph::new("Stock").styled(bold))
        .element(elements::Paragraph::new("Price").styled(bold))
        .push()
        .map_err(render_error)?;
    for product in &report.recent_products {
        recent
            .row()
            .element(elements::Paragraph::new(product.name.as_str()))
            .element(elements::Paragraph::new(product.sku.as_str()))
            .element(elements::Paragraph::new(product.stock.to_string()))
            .element(money_cell(product.price))
            .push()
            .map_err(render_error)?;
    }
    doc.push(recent);

    // 2. Render to memory
    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(render_error)?;
    Ok(buffer)
}

fn section_title(text: &str) -> elements::StyledElement<elements::Paragraph> {
    elements::Paragraph::new(text).styled(style::Style::new().bold().with_font_size(13))
}

fn money_cell(amount: Decimal) -> elements::Paragraph {
    let mut cell = elements::Paragraph::new(format!("$ {}", display_amount(amount)));
    cell.set_alignment(Alignment::Right);
    cell
}

fn bucket_table(headers: [&str; 3], bold: style::Style) -> Result<elements::TableLayout, AppError> {
    let mut table = elements::TableLayout::new(vec![4, 1, 2]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
    let [key, count, value] = headers;
    table
        .row()
        .element(elements::Paragraph::new(key).styled(bold))
        .element(elements::Paragraph::new(count).styled(bold))
        .element(elements::Paragraph::new(value).styled(bold))
        .push()
        .map_err(render_error)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::Product;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    fn row(
        vendor: (Uuid, &str),
        category: &str,
        price: Decimal,
        stock: i32,
        status: ProductStatus,
        age_minutes: i64,
    ) -> ProductReportRow {
        let created = Utc::now() - Duration::minutes(age_minutes);
        ProductReportRow {
            product: Product {
                id: Uuid::new_v4(),
                vendor_id: vendor.0,
                name: format!("{category}-{age_minutes}"),
                description: None,
                price,
                cost: None,
                stock,
                min_stock: 10,
                max_stock: 1000,
                sku: format!("SKU-{age_minutes}"),
                barcode: None,
                category: category.to_string(),
                status,
                image: None,
                created_at: created,
                updated_at: created,
            },
            vendor_name: Some(vendor.1.to_string()),
        }
    }

    #[test]
    fn groups_and_values_products() {
        let acme = (Uuid::new_v4(), "Acme");
        let bolt = (Uuid::new_v4(), "Bolt");
        let rows = vec![
            row(acme, "Tools", dec!(10), 3, ProductStatus::Available, 5),
            row(bolt, "Cables", dec!(2.5), 4, ProductStatus::OutOfStock, 1),
            row(acme, "Tools", dec!(1), 0, ProductStatus::Discontinued, 9),
        ];

        let report = build_report(rows).unwrap();

        assert_eq!(report.total_products, 3);
        assert_eq!(report.total_vendors, 2);
        assert_eq!(report.total_value, dec!(40));
        assert_eq!(
            report.products_by_category,
            vec![
                CategoryBucket { category: "Cables".into(), count: 1, value: dec!(10) },
                CategoryBucket { category: "Tools".into(), count: 2, value: dec!(30) },
            ]
        );
        assert_eq!(report.products_by_vendor[0].vendor_name, "Acme");
        assert_eq!(report.products_by_vendor[0].count, 2);
        let statuses: Vec<&str> = report
            .products_by_status
            .iter()
            .map(|b| b.status.as_str())
            .collect();
        assert_eq!(statuses, vec!["available", "discontinued", "out_of_stock"]);
        assert_eq!(report.recent_products[0].sku, "SKU-1");
    }

    #[test]
    fn recent_products_are_capped() {
        let acme = (Uuid::new_v4(), "Acme");
        let rows = (0..15)
            .map(|i| row(acme, "Misc", dec!(1), 1, ProductStatus::Available, i))
            .collect();
        let report = build_report(rows).unwrap();
        assert_eq!(report.recent_products.len(), RECENT_PRODUCTS);
        assert_eq!(report.recent_products[0].sku, "SKU-0");
    }

    #[test]
    fn empty_input_gives_empty_report() {
        let report = build_report(Vec::new()).unwrap();
        assert_eq!(report.total_products, 0);
        assert_eq!(report.total_vendors, 0);
        assert_eq!(report.total_value, Decimal::ZERO);
        assert!(report.products_by_status.is_empty());
    }

    #[test]
    fn vendors_sharing_a_name_keep_separate_buckets() {
        let first = (Uuid::new_v4(), "Acme");
        let second = (Uuid::new_v4(), "Acme");
        let rows = vec![
            row(first, "Tools", dec!(2), 5, ProductStatus::Available, 1),
            row(second, "Tools", dec!(3), 1, ProductStatus::Available, 2),
            row(second, "Tools", dec!(1), 1, ProductStatus::Available, 3),
        ];

        let report = build_report(rows).unwrap();

        assert_eq!(report.total_vendors, 2);
        assert_eq!(report.products_by_vendor.len(), 2);
        assert!(report.products_by_vendor.iter().all(|b| b.vendor_name == "Acme"));
        let first_bucket = report
            .products_by_vendor
            .iter()
            .find(|b| b.vendor_id == first.0)
            .unwrap();
        assert_eq!((first_bucket.count, first_bucket.value), (1, dec!(10)));
        let second_bucket = report
            .products_by_vendor
            .iter()
            .find(|b| b.vendor_id == second.0)
            .unwrap();
        assert_eq!((second_bucket.count, second_bucket.value), (2, dec!(4)));
    }

    #[test]
    fn oversized_inventory_value_is_an_error() {
        let acme = (Uuid::new_v4(), "Acme");
        let rows = vec![row(acme, "Gold", Decimal::MAX, 2, ProductStatus::Available, 1)];
        assert!(matches!(build_report(rows), Err(AppError::ReportRender(_))));
    }
}

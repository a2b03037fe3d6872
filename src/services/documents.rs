//! Printable artifacts rendered from snapshot data. Everything here is a
//! pure function over already-loaded models; nothing is persisted, so a
//! reprint always reflects the row as it stands.

use rust_decimal::Decimal;

use crate::entities::{
    customer::Model as CustomerModel, driver::Model as DriverModel, order::Model as OrderModel,
    payment::Model as PaymentModel, truck::Model as TruckModel,
};

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn page(title: &str, body: String) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; margin: 2rem; }}\n\
         h1 {{ border-bottom: 2px solid #333; padding-bottom: 0.5rem; }}\n\
         table {{ border-collapse: collapse; width: 100%; margin-top: 1rem; }}\n\
         th, td {{ border: 1px solid #999; padding: 0.4rem 0.8rem; text-align: left; }}\n\
         .meta {{ color: #555; margin-bottom: 1rem; }}\n\
         .signature {{ margin-top: 3rem; display: flex; justify-content: space-between; }}\n\
         .signature div {{ border-top: 1px solid #333; padding-top: 0.3rem; width: 40%; }}\n\
         </style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        title = escape(title),
        body = body,
    )
}

fn row(label: &str, value: &str) -> String {
    format!(
        "<tr><th>{}</th><td>{}</td></tr>\n",
        escape(label),
        escape(value)
    )
}

fn haulage_block(order: &OrderModel, truck: &TruckModel, driver: &DriverModel) -> String {
    let mut table = String::from("<table>\n");
    table.push_str(&row("Order number", &order.order_number));
    table.push_str(&row("Cement type", &order.cement_type));
    table.push_str(&row(
        "Quantity",
        &format!("{} {}", order.quantity, order.unit),
    ));
    table.push_str(&row("Truck", &truck.plate_number));
    table.push_str(&row("Driver", &driver.name));
    table.push_str(&row("Date", &order.created_at.format("%Y-%m-%d").to_string()));
    table.push_str("</table>\n");
    table
}

fn signature_block(left: &str, right: &str) -> String {
    format!(
        "<div class=\"signature\"><div>{}</div><div>{}</div></div>\n",
        escape(left),
        escape(right)
    )
}

/// Waybill: travels with the truck, signed by the receiver on delivery.
pub fn waybill(
    order: &OrderModel,
    customer: &CustomerModel,
    truck: &TruckModel,
    driver: &DriverModel,
) -> String {
    let mut body = format!(
        "<h1>Waybill</h1>\n<p class=\"meta\">Waybill No: {}</p>\n",
        escape(order.waybill_number.as_deref().unwrap_or("-")),
    );
    body.push_str(&haulage_block(order, truck, driver));
    body.push_str("<table>\n");
    body.push_str(&row("Consignee", &customer.name));
    body.push_str(&row(
        "Delivery address",
        order.delivery_address.as_deref().unwrap_or("-"),
    ));
    body.push_str("</table>\n");
    body.push_str(&signature_block("Driver signature", "Receiver signature"));
    page(&format!("Waybill {}", order.order_number), body)
}

/// Gate pass: authorizes the loaded truck out of the depot gate.
pub fn gate_pass(
    order: &OrderModel,
    customer: &CustomerModel,
    truck: &TruckModel,
    driver: &DriverModel,
) -> String {
    let mut body = format!(
        "<h1>Gate Pass</h1>\n<p class=\"meta\">Pass No: {}</p>\n",
        escape(order.gate_pass_number.as_deref().unwrap_or("-")),
    );
    body.push_str(&haulage_block(order, truck, driver));
    body.push_str("<table>\n");
    body.push_str(&row("Customer", &customer.name));
    body.push_str("</table>\n");
    body.push_str(&signature_block("Gate officer", "Driver signature"));
    page(&format!("Gate Pass {}", order.order_number), body)
}

/// Loading manifest: instructs the depot crew what to load.
pub fn loading_manifest(
    order: &OrderModel,
    customer: &CustomerModel,
    truck: &TruckModel,
    driver: &DriverModel,
) -> String {
    let mut body = format!(
        "<h1>Loading Manifest</h1>\n<p class=\"meta\">Manifest No: {}</p>\n",
        escape(order.loading_manifest_number.as_deref().unwrap_or("-")),
    );
    body.push_str(&haulage_block(order, truck, driver));
    body.push_str("<table>\n");
    body.push_str(&row("Customer", &customer.name));
    body.push_str(&row(
        "Truck capacity",
        &format!("{} {}", truck.capacity, truck.unit),
    ));
    body.push_str(&row("ATC No", order.atc_number.as_deref().unwrap_or("-")));
    body.push_str("</table>\n");
    body.push_str(&signature_block("Loading supervisor", "Driver signature"));
    page(&format!("Loading Manifest {}", order.order_number), body)
}

/// Invoice: the sale-price side of the order, billed to the customer.
pub fn invoice(order: &OrderModel, customer: &CustomerModel) -> String {
    let mut body = format!(
        "<h1>Invoice</h1>\n<p class=\"meta\">Order {} &middot; {}</p>\n",
        escape(&order.order_number),
        order.created_at.format("%Y-%m-%d"),
    );
    body.push_str("<table>\n");
    body.push_str(&row("Billed to", &customer.name));
    body.push_str(&row("Cement type", &order.cement_type));
    body.push_str(&row(
        "Quantity",
        &format!("{} {}", order.quantity, order.unit),
    ));
    body.push_str(&row("Unit price", &order.sale_price.to_string()));
    body.push_str(&row("Total amount", &order.total_amount.to_string()));
    body.push_str(&row("Payment status", &order.payment_status.to_string()));
    if let Some(terms) = &order.payment_terms {
        body.push_str(&row("Payment terms", terms));
    }
    body.push_str("</table>\n");
    page(&format!("Invoice {}", order.order_number), body)
}

/// Receipt for a single payment.
pub fn receipt(payment: &PaymentModel, customer: &CustomerModel) -> String {
    let mut body = format!(
        "<h1>Payment Receipt</h1>\n<p class=\"meta\">{}</p>\n",
        payment.created_at.format("%Y-%m-%d %H:%M"),
    );
    body.push_str("<table>\n");
    body.push_str(&row("Received from", &customer.name));
    body.push_str(&row("Amount", &payment.amount.to_string()));
    body.push_str(&row("Method", &payment.method.to_string()));
    body.push_str(&row("Status", &payment.status.to_string()));
    body.push_str(&row(
        "Reference",
        payment.reference.as_deref().unwrap_or("-"),
    ));
    body.push_str("</table>\n");
    body.push_str(&signature_block("Received by", "Customer"));
    page("Payment Receipt", body)
}

/// Statement of account: every order billed and every payment received,
/// closing with the live balance against the credit limit.
pub fn statement_of_account(
    customer: &CustomerModel,
    orders: &[OrderModel],
    payments: &[PaymentModel],
) -> String {
    let mut body = format!(
        "<h1>Statement of Account</h1>\n<p class=\"meta\">{}</p>\n",
        escape(&customer.name),
    );

    body.push_str("<h2>Orders</h2>\n<table>\n<tr><th>Date</th><th>Order</th><th>Cement</th><th>Quantity</th><th>Amount</th><th>Status</th></tr>\n");
    let mut billed = Decimal::ZERO;
    for order in orders {
        billed += order.total_amount;
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{} {}</td><td>{}</td><td>{}</td></tr>\n",
            order.created_at.format("%Y-%m-%d"),
            escape(&order.order_number),
            escape(&order.cement_type),
            order.quantity,
            order.unit,
            order.total_amount,
            order.status,
        ));
    }
    body.push_str("</table>\n");

    body.push_str("<h2>Payments</h2>\n<table>\n<tr><th>Date</th><th>Amount</th><th>Method</th><th>Status</th></tr>\n");
    let mut received = Decimal::ZERO;
    for payment in payments {
        if payment.status == crate::entities::payment::PaymentStatus::Confirmed {
            received += payment.amount;
        }
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            payment.created_at.format("%Y-%m-%d"),
            payment.amount,
            payment.method,
            payment.status,
        ));
    }
    body.push_str("</table>\n");

    body.push_str("<h2>Summary</h2>\n<table>\n");
    body.push_str(&row("Total billed", &billed.to_string()));
    body.push_str(&row("Total received (confirmed)", &received.to_string()));
    body.push_str(&row("Current balance", &customer.current_balance.to_string()));
    body.push_str(&row("Credit limit", &customer.credit_limit.to_string()));
    body.push_str("</table>\n");

    page(&format!("Statement - {}", customer.name), body)
}

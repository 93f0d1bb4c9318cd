use crate::models::{Invoice, MoveType, PaymentState, PostingState};
use chrono::NaiveDate;

/// 判断发票是否逾期且可发送提醒
///
/// 条件: 已过账的客户发票, 未付清, 到期日早于 today, 且尚未发送过通知。
/// 没有到期日的发票永远不算逾期。
pub fn is_overdue(invoice: &Invoice, today: NaiveDate) -> bool {
    invoice.move_type == MoveType::OutInvoice
        && invoice.payment_state != PaymentState::Paid
        && invoice.state == PostingState::Posted
        && invoice.due_date.is_some_and(|due| due < today)
        && !invoice.notice_sent
}

/// 按同一条件过滤, 保持输入顺序
pub fn select_overdue<I>(invoices: I, today: NaiveDate) -> Vec<Invoice>
where
    I: IntoIterator<Item = Invoice>,
{
    invoices
        .into_iter()
        .filter(|invoice| is_overdue(invoice, today))
        .collect()
}

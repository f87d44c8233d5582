mod cart_ledger;
mod checkout_flow;
mod health_check;
mod invoices;
mod role_gate;
mod test_utils;

//! Dual-direction connector for the inquiry stage.
//!
//! Ingress: parses inquiry records from a file into RECEIVED inquiries and
//! delivers them via `on_message`. Egress: receives the quotes the service
//! publishes and walks each inquiry through its terminal transitions by
//! re-emitting it into the service: QUOTED then DONE for a quoted
//! inquiry, REJECTED once for a rejection.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use fi_core::products::ProductService;
use fi_core::service::{Connector, Service};
use fi_core::types::{fractional, Inquiry, InquiryState, Side};

use crate::service::InquiryService;

/// Reads inquiry records and drives quote transitions back into the
/// service.
pub struct InquiryFileConnector {
    path: PathBuf,
    service: Rc<InquiryService>,
    products: Rc<ProductService>,
}

impl InquiryFileConnector {
    /// Create the connector and attach it to the service.
    pub fn create(
        path: impl Into<PathBuf>,
        service: Rc<InquiryService>,
        products: Rc<ProductService>,
    ) -> Rc<Self> {
        let connector = Rc::new(Self {
            path: path.into(),
            service: service.clone(),
            products,
        });
        service.set_connector(&(connector.clone() as Rc<dyn Connector<Inquiry>>));
        connector
    }

    /// Read every record and deliver it via `on_message`. Returns the
    /// number of inquiries delivered.
    pub fn run(&self) -> Result<u64> {
        let file = File::open(&self.path)
            .with_context(|| format!("cannot open inquiry input {}", self.path.display()))?;
        let reader = BufReader::new(file);

        let mut delivered = 0u64;
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.context("failed to read inquiry line")?;
            if line_num == 0 || line.trim().is_empty() {
                continue; // header
            }
            match self.parse_row(&line) {
                Some(inquiry) => {
                    self.service.on_message(inquiry);
                    delivered += 1;
                }
                None => warn!(line_num = line_num + 1, "skipping bad inquiry row"),
            }
        }

        info!(path = %self.path.display(), inquiries = delivered, "inquiry ingest complete");
        Ok(delivered)
    }

    fn parse_row(&self, line: &str) -> Option<Inquiry> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 7 {
            return None;
        }

        let product_id = fields[2];
        let bond = match self.products.bond(product_id) {
            Some(bond) => bond,
            None => {
                warn!(product_id, "unknown bond in inquiry input");
                return None;
            }
        };

        Some(Inquiry {
            inquiry_id: fields[0].to_string(),
            product: bond,
            side: Side::parse(fields[3]),
            quantity: fields[4].parse().ok()?,
            price: fractional::decode(fields[5]).ok()?,
            state: InquiryState::parse(fields[6]),
        })
    }
}

impl Connector<Inquiry> for InquiryFileConnector {
    /// Walk a published inquiry through its terminal transitions.
    fn publish(&self, event: &Inquiry) -> Result<()> {
        if event.state == InquiryState::Rejected {
            self.service.on_message(event.clone());
        } else {
            self.service
                .on_message(event.with_state(InquiryState::Quoted));
            self.service.on_message(event.with_state(InquiryState::Done));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{InquiryListener, QUOTE_PRICE};
    use chrono::NaiveDate;
    use fi_core::service::ServiceListener;
    use fi_core::types::{Bond, BondIdType};
    use std::cell::RefCell;
    use std::io::Write;

    fn products() -> Rc<ProductService> {
        let products = ProductService::new();
        products.add(Bond::new(
            "9128283H1",
            BondIdType::Cusip,
            "T",
            0.0175,
            NaiveDate::from_ymd_opt(2019, 11, 30).unwrap(),
        ));
        Rc::new(products)
    }

    struct Capture {
        updates: Rc<RefCell<Vec<Inquiry>>>,
    }

    impl ServiceListener<Inquiry> for Capture {
        fn process_update(&self, event: &Inquiry) {
            self.updates.borrow_mut().push(event.clone());
        }
    }

    fn write_input(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("create temp file");
        write!(f, "{}", content).expect("write temp file");
        f
    }

    /// The full quote loop: one ingested RECEIVED inquiry is observed as
    /// RECEIVED, QUOTED, DONE, with the quoted price overriding the
    /// client's indication.
    #[test]
    fn test_received_inquiry_reaches_done_at_quote_price() {
        let input = write_input(
            "InquiryID,BondIDType,BondID,Side,Quantity,Price,State\n\
             INQ001,CUSIP,9128283H1,BUY,1000000,99-160,RECEIVED\n",
        );

        let service = Rc::new(InquiryService::new());
        let updates = Rc::new(RefCell::new(Vec::new()));
        service.add_listener(Rc::new(Capture {
            updates: updates.clone(),
        }));
        service.add_listener(Rc::new(InquiryListener::new(service.clone())));

        let connector = InquiryFileConnector::create(input.path(), service.clone(), products());
        assert_eq!(connector.run().unwrap(), 1);

        let updates = updates.borrow();
        let states: Vec<InquiryState> = updates.iter().map(|i| i.state).collect();
        assert_eq!(
            states,
            vec![
                InquiryState::Received,
                InquiryState::Quoted,
                InquiryState::Done
            ]
        );
        // The client asked 99.5; the quote overrides it.
        assert_eq!(updates[0].price, 99.5);
        assert_eq!(updates[1].price, QUOTE_PRICE);
        assert_eq!(updates[2].price, QUOTE_PRICE);

        // Terminal state is cached.
        assert_eq!(
            service.get_data("INQ001").unwrap().state,
            InquiryState::Done
        );
    }

    /// No inquiry is quoted twice: three observed updates per ingested
    /// inquiry, exactly.
    #[test]
    fn test_state_machine_terminates() {
        let input = write_input(
            "InquiryID,BondIDType,BondID,Side,Quantity,Price,State\n\
             INQ001,CUSIP,9128283H1,BUY,1000000,99-160,RECEIVED\n\
             INQ002,CUSIP,9128283H1,SELL,2000000,100-000,RECEIVED\n",
        );

        let service = Rc::new(InquiryService::new());
        let updates = Rc::new(RefCell::new(Vec::new()));
        service.add_listener(Rc::new(Capture {
            updates: updates.clone(),
        }));
        service.add_listener(Rc::new(InquiryListener::new(service.clone())));

        let connector = InquiryFileConnector::create(input.path(), service.clone(), products());
        connector.run().unwrap();

        assert_eq!(updates.borrow().len(), 6);
    }

    #[test]
    fn test_rejection_re_emits_once() {
        let service = Rc::new(InquiryService::new());
        let updates = Rc::new(RefCell::new(Vec::new()));
        service.add_listener(Rc::new(Capture {
            updates: updates.clone(),
        }));

        let input = write_input("InquiryID,BondIDType,BondID,Side,Quantity,Price,State\n");
        let _connector = InquiryFileConnector::create(input.path(), service.clone(), products());

        let inquiry = Inquiry {
            inquiry_id: "INQ009".to_string(),
            product: products().bond("9128283H1").unwrap(),
            side: Side::Sell,
            quantity: 500_000,
            price: 99.0,
            state: InquiryState::Received,
        };
        service.on_message(inquiry);
        service.reject_inquiry("INQ009");

        let states: Vec<InquiryState> = updates.borrow().iter().map(|i| i.state).collect();
        assert_eq!(states, vec![InquiryState::Received, InquiryState::Rejected]);
        assert_eq!(
            service.get_data("INQ009").unwrap().state,
            InquiryState::Rejected
        );
    }

    #[test]
    fn test_unknown_state_defaults_to_received() {
        let input = write_input(
            "InquiryID,BondIDType,BondID,Side,Quantity,Price,State\n\
             INQ001,CUSIP,9128283H1,BUY,1000000,99-160,PENDING\n",
        );

        let service = Rc::new(InquiryService::new());
        service.add_listener(Rc::new(InquiryListener::new(service.clone())));
        let connector = InquiryFileConnector::create(input.path(), service.clone(), products());
        connector.run().unwrap();

        // Treated as RECEIVED, so the quote loop ran to DONE.
        assert_eq!(
            service.get_data("INQ001").unwrap().state,
            InquiryState::Done
        );
    }
}

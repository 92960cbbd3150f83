//! The pipeline engine: constructs every stage, wires the dataflow
//! topology, and drives the four ingress streams in order.
//!
//! Wiring happens in four chains, each finished by draining its ingress
//! file: trades into booking/position/risk, prices into streaming and the
//! GUI, depth into algo execution (whose executions loop back into trade
//! booking), and inquiries through the quote state machine. An output file
//! that cannot be opened skips its persister; an ingress file that cannot
//! be opened skips its stream; neither stops the run.

use std::rc::Rc;
use std::time::Instant;

use anyhow::Result;
use tracing::{info, warn};

use fi_booking::{
    PositionListener, PositionService, RiskListener, RiskService, TradeBookingFileConnector,
    TradeBookingListener, TradeBookingService,
};
use fi_core::config::AppConfig;
use fi_execution::{AlgoExecutionListener, AlgoExecutionService, ExecutionListener, ExecutionService};
use fi_inquiry::{InquiryFileConnector, InquiryListener, InquiryService};
use fi_market_data::{MarketDataFileConnector, MarketDataService};
use fi_pricing::{
    AlgoStreamingListener, AlgoStreamingService, GuiFileConnector, GuiListener, GuiService,
    PricingFileConnector, PricingService, StreamingListener, StreamingService,
};
use fi_recorder::{
    ExecutionHistoryConnector, ExecutionHistoryListener, ExecutionHistoryService,
    InquiryHistoryConnector, InquiryHistoryListener, InquiryHistoryService,
    PositionHistoryConnector, PositionHistoryListener, PositionHistoryService,
    RiskHistoryConnector, RiskHistoryListener, RiskHistoryService, StreamingHistoryConnector,
    StreamingHistoryListener, StreamingHistoryService,
};

use crate::datagen;
use crate::reference_data;

/// Builds and runs the full back-office pipeline.
pub struct PipelineEngine {
    config: AppConfig,
}

impl PipelineEngine {
    /// Create an engine for the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Write fresh ingress files for every stream.
    pub fn generate_inputs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config.paths.data_dir)?;

        let products = reference_data::bootstrap_products();
        let bonds = products.bonds_for_ticker(&self.config.ticker);
        let datagen_cfg = &self.config.datagen;

        datagen::generate_trades(
            &self.config.paths.trade_input,
            &bonds,
            datagen_cfg.trades_per_bond,
        )?;
        datagen::generate_prices(
            &self.config.paths.price_input,
            &bonds,
            datagen_cfg.price_rows_per_bond,
        )?;
        datagen::generate_market_data(
            &self.config.paths.market_data_input,
            &bonds,
            datagen_cfg.depth_rows_per_bond,
        )?;
        datagen::generate_inquiries(
            &self.config.paths.inquiry_input,
            &bonds,
            datagen_cfg.inquiries_per_bond,
        )?;
        Ok(())
    }

    /// Wire the topology and drain every ingress stream.
    pub fn run(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config.paths.data_dir)?;

        let products = Rc::new(reference_data::bootstrap_products());
        let pv01 = reference_data::pv01_by_bond();
        let sectors = reference_data::sector_partition(&products);

        // ── Booking chain: trades -> position -> risk ──────────────────
        let trade_booking = Rc::new(TradeBookingService::new());
        let position = Rc::new(PositionService::new(&products, &self.config.ticker));
        let risk = Rc::new(RiskService::new(&products, &pv01));

        trade_booking.add_listener(Rc::new(PositionListener::new(position.clone())));
        position.add_listener(Rc::new(RiskListener::new(risk.clone())));

        if let Some(connector) = open_or_skip(
            PositionHistoryConnector::create(&self.config.paths.position_output),
            "position history",
        ) {
            let history = Rc::new(PositionHistoryService::new(Rc::new(connector)));
            position.add_listener(Rc::new(PositionHistoryListener::new(history)));
        }

        if let Some(connector) = open_or_skip(
            RiskHistoryConnector::create(&self.config.paths.risk_output),
            "risk history",
        ) {
            let history = Rc::new(RiskHistoryService::new(Rc::new(connector)));
            risk.add_listener(Rc::new(RiskHistoryListener::new(
                history,
                risk.clone(),
                sectors,
            )));
        }

        self.drive("trades", || {
            TradeBookingFileConnector::new(
                &self.config.paths.trade_input,
                trade_booking.clone(),
                products.clone(),
            )
            .run()
        });

        // ── Pricing chain: prices -> streams and GUI ───────────────────
        let pricing = Rc::new(PricingService::new());
        let algo_streaming = Rc::new(AlgoStreamingService::new());
        let streaming = Rc::new(StreamingService::new());

        pricing.add_listener(Rc::new(AlgoStreamingListener::new(algo_streaming.clone())));

        if let Some(connector) = open_or_skip(
            GuiFileConnector::create(&self.config.paths.gui_output),
            "GUI output",
        ) {
            let gui = Rc::new(GuiService::new(
                std::time::Duration::from_millis(self.config.gui.throttle_ms),
                self.config.gui.max_publications,
                Rc::new(connector),
            ));
            pricing.add_listener(Rc::new(GuiListener::new(gui)));
        }

        algo_streaming.add_listener(Rc::new(StreamingListener::new(streaming.clone())));

        if let Some(connector) = open_or_skip(
            StreamingHistoryConnector::create(&self.config.paths.streaming_output),
            "streaming history",
        ) {
            let history = Rc::new(StreamingHistoryService::new(Rc::new(connector)));
            streaming.add_listener(Rc::new(StreamingHistoryListener::new(history)));
        }

        self.drive("prices", || {
            PricingFileConnector::new(
                &self.config.paths.price_input,
                pricing.clone(),
                products.clone(),
            )
            .run()
        });

        // ── Market data chain: depth -> executions -> booked trades ────
        let market_data = Rc::new(MarketDataService::new());
        let algo_execution = Rc::new(AlgoExecutionService::new());
        let execution = Rc::new(ExecutionService::new());

        market_data.add_listener(Rc::new(AlgoExecutionListener::new(algo_execution.clone())));
        algo_execution.add_listener(Rc::new(ExecutionListener::new(execution.clone())));
        execution.add_listener(Rc::new(TradeBookingListener::new(trade_booking.clone())));

        if let Some(connector) = open_or_skip(
            ExecutionHistoryConnector::create(&self.config.paths.execution_output),
            "execution history",
        ) {
            let history = Rc::new(ExecutionHistoryService::new(Rc::new(connector)));
            execution.add_listener(Rc::new(ExecutionHistoryListener::new(history)));
        }

        self.drive("market data", || {
            MarketDataFileConnector::new(
                &self.config.paths.market_data_input,
                market_data.clone(),
                products.clone(),
            )
            .run()
        });

        // ── Inquiry chain: inquiries -> quote loop ─────────────────────
        let inquiry = Rc::new(InquiryService::new());

        // History first so it observes every transition, then the quoting
        // listener that drives them.
        if let Some(connector) = open_or_skip(
            InquiryHistoryConnector::create(&self.config.paths.inquiry_output),
            "inquiry history",
        ) {
            let history = Rc::new(InquiryHistoryService::new(Rc::new(connector)));
            inquiry.add_listener(Rc::new(InquiryHistoryListener::new(history)));
        }
        inquiry.add_listener(Rc::new(InquiryListener::new(inquiry.clone())));

        let inquiry_connector = InquiryFileConnector::create(
            &self.config.paths.inquiry_input,
            inquiry.clone(),
            products.clone(),
        );
        self.drive("inquiries", || inquiry_connector.run());

        info!(
            booked_trades = trade_booking.counter(),
            executions = algo_execution.emitted(),
            "pipeline run complete"
        );
        Ok(())
    }

    /// Drain one ingress stream, logging its elapsed time. A stream whose
    /// file cannot be read is reported and skipped.
    fn drive(&self, stream: &str, run: impl FnOnce() -> Result<u64>) {
        let start = Instant::now();
        match run() {
            Ok(records) => info!(
                stream,
                records,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "ingress stream drained"
            ),
            Err(e) => warn!(stream, error = %e, "ingress stream skipped"),
        }
    }
}

/// Unwrap a stage resource, downgrading failure to a warning.
fn open_or_skip<T>(result: Result<T>, what: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(resource = what, error = %e, "resource unavailable, stage skipped");
            None
        }
    }
}

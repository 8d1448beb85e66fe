// Licensed under the Apache-2.0 license

use std::error::Error;

use histogram_emu_bus::{Bus, BusError, Clock};
use histogram_emu_periph::Histogram;
use histogram_emu_types::{EmuAddr, EmuData, EmuSize, SigIn, SigOut};

use crate::monitor::DrainMonitor;
use crate::trace::Trace;
use crate::{DrainCapture, HwModel, InitParams};

pub struct EmulatedRegBus<'a> {
    model: &'a mut ModelEmulated,
}

impl<'a> Bus for EmulatedRegBus<'a> {
    fn read(&mut self, size: EmuSize, addr: EmuAddr) -> Result<EmuData, BusError> {
        self.model.histogram.read(size, addr)
    }
    fn write(&mut self, size: EmuSize, addr: EmuAddr, val: EmuData) -> Result<(), BusError> {
        self.model.histogram.write(size, addr, val)
    }
    fn warm_reset(&mut self) {
        self.model.histogram.warm_reset()
    }
}

pub struct ModelEmulated {
    clock: Clock,
    histogram: Histogram,
    monitor: DrainMonitor,
    trace: Option<Trace>,
}

impl ModelEmulated {
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }
}

impl HwModel for ModelEmulated {
    type TBus<'a> = EmulatedRegBus<'a>;

    fn init(params: InitParams) -> Result<Self, Box<dyn Error>>
    where
        Self: Sized,
    {
        let clock = Clock::new();
        let histogram = Histogram::new(&clock, params.config);
        log::info!("histogram model created: {:?}", histogram.config());
        Ok(ModelEmulated {
            clock,
            histogram,
            monitor: DrainMonitor::new(),
            trace: params.trace.map(Trace::new),
        })
    }

    fn reg_bus<'a>(&'a mut self) -> Self::TBus<'a> {
        EmulatedRegBus { model: self }
    }

    fn step(&mut self) {
        let cycle = self.clock.now();
        self.histogram.eval();
        self.monitor
            .observe(cycle, &self.histogram.input, &self.histogram.output);
        if let Some(trace) = &mut self.trace {
            if let Err(e) = trace.record(cycle, &self.histogram.input, &self.histogram.output) {
                log::warn!("trace disabled: {e}");
                self.trace = None;
            }
        }
        self.clock
            .increment_and_process_timer_actions(1, &mut self.histogram);
    }

    fn cycle_count(&self) -> u64 {
        self.clock.now()
    }

    fn input(&mut self) -> &mut SigIn {
        &mut self.histogram.input
    }

    fn output(&self) -> SigOut {
        self.histogram.output
    }

    fn take_drain(&mut self) -> Option<DrainCapture> {
        self.monitor.take()
    }

    fn partial_drain_len(&self) -> usize {
        self.monitor.partial_len()
    }

    fn is_settled(&self) -> bool {
        self.histogram.is_settled()
    }
}

impl Drop for ModelEmulated {
    fn drop(&mut self) {
        if let Some(trace) = &mut self.trace {
            let _ = trace.flush();
        }
    }
}

use crate::crawlers::{BrowserSession, JobContext, SessionJob};
use crate::error::Result;
use crate::parsers::CardCounts;
use crate::results::CombinationDescriptor;
use crate::search::{SearchRequest, build_search_url};
use async_trait::async_trait;
use url::Url;

/// Loads a search once and enumerates every outbound×inbound pairing on it
pub struct DiscoveryJob {
    pub request: SearchRequest,
    pub url: String,
}

impl DiscoveryJob {
    pub fn new(base: &Url, request: SearchRequest) -> Self {
        let url = build_search_url(base, &request);
        Self { request, url }
    }
}

#[async_trait]
impl SessionJob for DiscoveryJob {
    type Output = Vec<CombinationDescriptor>;

    fn label(&self) -> String {
        format!(
            "search {}-{} {}/{}",
            self.request.origin, self.request.destination, self.request.depart, self.request.return_date
        )
    }

    async fn run(&self, session: &mut dyn BrowserSession, ctx: &JobContext) -> Result<Self::Output> {
        session.goto(&self.url).await?;
        session
            .wait_for(ctx.page.results_ready(), ctx.step_timeout)
            .await?;

        let markup = session.outer_html(ctx.page.results_region()).await?;
        let counts = ctx.page.count_cards(&markup)?;

        ::log::info!(
            "Found {} outbound and {} inbound options for {}",
            counts.outbound,
            counts.inbound,
            self.label()
        );
        Ok(enumerate(&self.url, counts))
    }
}

/// Cartesian product of outbound and inbound positions, outbound-major
pub fn enumerate(url: &str, counts: CardCounts) -> Vec<CombinationDescriptor> {
    let mut combinations = Vec::with_capacity(counts.outbound * counts.inbound);
    for outbound in 0..counts.outbound {
        for inbound in 0..counts.inbound {
            combinations.push(CombinationDescriptor::new(url, outbound, inbound));
        }
    }
    combinations
}

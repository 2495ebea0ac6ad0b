// SMS inbox and outgoing messages.

use tracing::debug;

use crate::cgi::Act;
use crate::client::RouterClient;
use crate::error::Error;
use crate::models::SmsMessage;

impl RouterClient {
    /// Messages on the first inbox page.
    ///
    /// The inbox is paged server-side: selecting the page and listing its
    /// entries go out in one batch so nothing can move the cursor between.
    pub async fn get_sms(&mut self) -> Result<Vec<SmsMessage>, Error> {
        debug!("reading SMS inbox");
        let acts = [
            Act::set("LTE_SMS_RECVMSGBOX").assign("PageNumber", 1),
            Act::get_list("LTE_SMS_RECVMSGENTRY").fields(SmsMessage::FIELDS),
        ];
        let reply = self.call(&acts).await?;
        Ok(reply.objects(1).map(SmsMessage::from_object).collect())
    }

    /// Queue a text message. The device gives no delivery report.
    ///
    /// SET `LTE_SMS_SENDNEWMSG`
    pub async fn send_sms(&mut self, number: &str, text: &str) -> Result<(), Error> {
        debug!(to = number, chars = text.chars().count(), "sending SMS");
        let act = Act::set("LTE_SMS_SENDNEWMSG")
            .assign("index", 1)
            .assign("to", number)
            .assign("textContent", text);
        self.call(&[act]).await?;
        Ok(())
    }
}

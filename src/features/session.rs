use super::account::{format_money, format_percent, Account, AccountKey, AccountNumber};
use super::investment::{Outcome, UnitSource};
use super::prompt::{Console, PromptError, PromptResult};
use super::store::Store;
use anyhow::Context;
use std::io::{BufRead, Write};

const ROOT_MENU: &str = "
  1 - Create account
  2 - Enter account
  3 - Report an issue
  4 - Exit
Enter your option:";

const ACCOUNT_MENU: &str = "
  1 - Withdraw
  2 - Deposit
  3 - Invest
  4 - Back
Enter your option:";

const INVALID_OPTION: &str = "Invalid option.";
const INVALID_INPUT: &str = "Invalid input. Returning to main menu...\n";
const NOT_FOUND: &str = "Account not found.";

#[derive(Debug, Clone, PartialEq)]
enum MenuState {
    Root,
    InAccount(AccountKey),
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RootChoice {
    CreateAccount,
    EnterAccount,
    ReportIssue,
    Exit,
}

impl RootChoice {
    fn from_option(option: i32) -> Option<Self> {
        match option {
            1 => Some(Self::CreateAccount),
            2 => Some(Self::EnterAccount),
            3 => Some(Self::ReportIssue),
            4 => Some(Self::Exit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Operation {
    Withdraw,
    Deposit,
    Invest,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AccountChoice {
    Operation(Operation),
    Back,
}

impl AccountChoice {
    fn from_option(option: i32) -> Option<Self> {
        match option {
            1 => Some(Self::Operation(Operation::Withdraw)),
            2 => Some(Self::Operation(Operation::Deposit)),
            3 => Some(Self::Operation(Operation::Invest)),
            4 => Some(Self::Back),
            _ => None,
        }
    }
}

/// Drives the root and account menus over one console until the user exits.
///
/// A non-numeric answer anywhere abandons the flow in progress and lands back
/// on the root menu.
pub struct Session<R, W, U> {
    console: Console<R, W>,
    store: Store,
    units: U,
}

impl<R: BufRead, W: Write, U: UnitSource> Session<R, W, U> {
    pub fn new(console: Console<R, W>, store: Store, units: U) -> Self {
        Self {
            console,
            store,
            units,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        let mut state = MenuState::Root;
        loop {
            state = match state {
                MenuState::Terminated => return Ok(()),
                current => match self.step(current) {
                    Ok(next) => next,
                    Err(PromptError::Invalid { input, expected }) => {
                        warn!("Expected {expected}, got {input:?}; resetting to root menu");
                        self.console
                            .say(INVALID_INPUT)
                            .context("Unable to write to console")?;
                        MenuState::Root
                    }
                    Err(PromptError::Closed) => {
                        info!("Input closed, ending session");
                        MenuState::Terminated
                    }
                    Err(e) => return Err(e).context("Console session failed"),
                },
            };
            debug!("Menu state now {:?}", state);
        }
    }

    fn step(&mut self, state: MenuState) -> PromptResult<MenuState> {
        match state {
            MenuState::Root => self.root_menu(),
            MenuState::InAccount(key) => self.account_menu(key),
            MenuState::Terminated => Ok(MenuState::Terminated),
        }
    }

    fn root_menu(&mut self) -> PromptResult<MenuState> {
        use RootChoice::*;

        self.console.say(ROOT_MENU)?;
        let option = self.console.read_integer()?;

        match RootChoice::from_option(option) {
            Some(CreateAccount) => {
                self.create_account()?;
                Ok(MenuState::Root)
            }
            Some(EnterAccount) => self.enter_account(),
            Some(ReportIssue) => {
                self.report_issue()?;
                Ok(MenuState::Root)
            }
            Some(Exit) => {
                self.console.say("Exiting...")?;
                Ok(MenuState::Terminated)
            }
            None => {
                self.console.say(INVALID_OPTION)?;
                Ok(MenuState::Root)
            }
        }
    }

    fn read_key(&mut self, number_prompt: &str, branch_prompt: &str) -> PromptResult<AccountKey> {
        self.console.prompt(number_prompt)?;
        let number = AccountNumber::new(self.console.read_integer()?);
        self.console.prompt(branch_prompt)?;
        let branch = self.console.read_line()?;
        Ok(AccountKey::new(number, branch))
    }

    fn create_account(&mut self) -> PromptResult<()> {
        let key = self.read_key(
            "Please enter the account number: ",
            "Please enter the branch number: ",
        )?;
        self.console.prompt("Please enter the customer name: ")?;
        let owner_name = self.console.read_line()?;
        self.console.prompt("Please enter the opening balance: ")?;
        let balance = self.console.read_amount()?;

        let account = Account::new(key.clone(), owner_name, balance);
        let welcome = account.welcome_message();
        info!("Opening account {key} for {}", account.owner_name());
        if self.store.put(account).is_some() {
            warn!("Account {key} already existed and was replaced");
        }

        self.console.say(&welcome)
    }

    fn enter_account(&mut self) -> PromptResult<MenuState> {
        let key = self.read_key("Enter the account number: ", "Enter the branch: ")?;

        if self.store.get(&key).is_none() {
            debug!("No account under {key}");
            self.console.say(NOT_FOUND)?;
            return Ok(MenuState::Root);
        }
        Ok(MenuState::InAccount(key))
    }

    fn report_issue(&mut self) -> PromptResult<()> {
        self.console.prompt("Report your issue here: ")?;
        let report = self.console.read_line()?;
        info!("Issue reported: {report}");
        self.console.say("Thank you for your report! :)")
    }

    fn account_menu(&mut self, key: AccountKey) -> PromptResult<MenuState> {
        self.console.say(ACCOUNT_MENU)?;
        let option = self.console.read_integer()?;

        let operation = match AccountChoice::from_option(option) {
            Some(AccountChoice::Operation(operation)) => operation,
            Some(AccountChoice::Back) => {
                self.console.say("Going back...")?;
                return Ok(MenuState::Root);
            }
            None => {
                self.console.say(INVALID_OPTION)?;
                return Ok(MenuState::InAccount(key));
            }
        };

        let Self {
            console,
            store,
            units,
        } = self;
        let account = match store.get_mut(&key) {
            Some(account) => account,
            None => {
                console.say(NOT_FOUND)?;
                return Ok(MenuState::Root);
            }
        };

        match operation {
            Operation::Withdraw => withdraw(console, account)?,
            Operation::Deposit => deposit(console, account)?,
            Operation::Invest => invest(console, account, units)?,
        }
        Ok(MenuState::InAccount(key))
    }

    #[cfg(test)]
    pub(crate) fn console(&self) -> &Console<R, W> {
        &self.console
    }
}

fn withdraw<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    account: &mut Account,
) -> PromptResult<()> {
    console.prompt("Enter the amount to withdraw: ")?;
    let amount = console.read_amount()?;

    match account.withdraw(amount) {
        Ok(balance) => console.say(&format!(
            "Withdrawal of R$ {} completed successfully. Current balance: R$ {}",
            format_money(amount),
            format_money(balance)
        )),
        Err(e) => {
            warn!("Withdrawal from {} refused: {e}", account.key());
            console.say(e.notice())
        }
    }
}

fn deposit<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    account: &mut Account,
) -> PromptResult<()> {
    console.prompt("Enter the amount to deposit: ")?;
    let amount = console.read_amount()?;

    match account.deposit(amount) {
        Ok(balance) => console.say(&format!(
            "Deposit of R$ {} completed. Current balance: R$ {}",
            format_money(amount),
            format_money(balance)
        )),
        Err(e) => {
            warn!("Deposit into {} refused: {e}", account.key());
            console.say(e.notice())
        }
    }
}

fn invest<R: BufRead, W: Write, U: UnitSource + ?Sized>(
    console: &mut Console<R, W>,
    account: &mut Account,
    units: &mut U,
) -> PromptResult<()> {
    console.prompt("Enter the amount to invest: ")?;
    let amount = console.read_amount()?;

    let investment = match account.invest(amount, units) {
        Ok(investment) => investment,
        Err(e) => {
            warn!("Investment from {} refused: {e}", account.key());
            return console.say(e.notice());
        }
    };

    let percent = format_percent(investment.factor.percent());
    match investment.factor.outcome() {
        Outcome::Loss => console.say(&format!(
            "Too bad, the investment had a loss of {percent}% :("
        ))?,
        Outcome::Gain => console.say(&format!(
            "Great! The investment made a profit of {percent}% ;)"
        ))?,
        Outcome::Neutral => console
            .say("Nobody won and nobody lost...\nThe investment came to nothing :/")?,
    }
    console.say(&format!(
        "Current balance: R$ {}",
        format_money(investment.balance)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::investment::ScriptedUnits;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::io::Cursor;
    use test_case::test_case;

    type TestSession = Session<Cursor<Vec<u8>>, Vec<u8>, ScriptedUnits>;

    fn session(script: &str, units: &[f64]) -> TestSession {
        let console = Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
        Session::new(console, Store::new(), ScriptedUnits::new(units.iter().copied()))
    }

    fn run(script: &str, units: &[f64]) -> (String, TestSession) {
        let mut session = session(script, units);
        session.run().unwrap();
        let output = String::from_utf8(session.console().output().clone()).unwrap();
        (output, session)
    }

    fn balance_of(session: &TestSession, number: i32, branch: &str) -> Option<Decimal> {
        session
            .store()
            .get(&AccountKey::new(AccountNumber::new(number), branch))
            .map(Account::balance)
    }

    const OPEN_ANA: &str = "1\n100\n001\nAna\n500.00\n";
    const ENTER_ANA: &str = "2\n100\n001\n";

    #[test]
    fn walks_through_the_banking_scenarios() {
        let script = [
            OPEN_ANA,
            ENTER_ANA,
            "1\n200.00\n",
            "1\n400.00\n",
            "2\n50.00\n",
            "3\n100.00\n",
            "3\n100.00\n",
            "4\n4\n",
        ]
        .concat();
        let (output, session) = run(&script, &[0.75, 0.375]);

        assert!(output.contains("Your branch is 001, account 100, and your balance of 500.00"));
        assert!(output.contains(
            "Withdrawal of R$ 200.00 completed successfully. Current balance: R$ 300.00"
        ));
        assert!(output.contains("Insufficient balance."));
        assert!(output.contains("Deposit of R$ 50.00 completed. Current balance: R$ 350.00"));
        assert!(output.contains("made a profit of 50% ;)\nCurrent balance: R$ 400.00"));
        assert!(output.contains("had a loss of 25% :(\nCurrent balance: R$ 375.00"));
        assert!(output.contains("Going back...") && output.ends_with("Exiting...\n"));
        assert_eq!(balance_of(&session, 100, "001"), Some(dec!(375)));
    }

    #[test_case(0.5625, "made a profit of 13% ;)", "R$ 512.50" ; "half percent gain rounds up")]
    #[test_case(0.4375, "had a loss of 13% :(", "R$ 487.50" ; "half percent loss rounds up")]
    fn investment_percent_rounds_half_away_from_zero(unit: f64, message: &str, balance: &str) {
        let script = [OPEN_ANA, ENTER_ANA, "3\n100\n4\n4\n"].concat();
        let (output, _) = run(&script, &[unit]);

        assert!(output.contains(message), "missing {message:?} in {output}");
        assert!(output.contains(&format!("Current balance: {balance}")));
    }

    #[test]
    fn neutral_investment_keeps_balance() {
        let script = [OPEN_ANA, ENTER_ANA, "3\n100\n4\n4\n"].concat();
        let (output, session) = run(&script, &[0.5]);

        assert!(output.contains("The investment came to nothing :/\nCurrent balance: R$ 500.00"));
        assert_eq!(balance_of(&session, 100, "001"), Some(dec!(500)));
    }

    #[test]
    fn investment_over_balance_is_refused() {
        let script = [OPEN_ANA, ENTER_ANA, "3\n900\n4\n4\n"].concat();
        let (output, session) = run(&script, &[0.75]);

        assert!(output.contains("Insufficient balance."));
        assert!(!output.contains("profit"));
        assert_eq!(balance_of(&session, 100, "001"), Some(dec!(500)));
    }

    #[test]
    fn missing_account_is_not_created() {
        let (output, session) = run("2\n7\nzzz\n4\n", &[]);

        assert!(output.contains(NOT_FOUND));
        assert!(session.store().is_empty());
    }

    #[test]
    fn branch_must_match_exactly() {
        let script = [OPEN_ANA, "2\n100\n01\n4\n"].concat();
        let (output, _) = run(&script, &[]);

        assert!(output.contains(NOT_FOUND));
        assert!(!output.contains("1 - Withdraw"));
    }

    #[test_case("0\n4\n" ; "zero")]
    #[test_case("9\n4\n" ; "nine")]
    #[test_case("-1\n4\n" ; "negative")]
    fn unknown_root_option_stays_on_root(script: &str) {
        let (output, _) = run(script, &[]);

        assert_eq!(output.matches(INVALID_OPTION).count(), 1);
        assert_eq!(output.matches("1 - Create account").count(), 2);
    }

    #[test]
    fn unknown_account_option_stays_in_account() {
        let script = [OPEN_ANA, ENTER_ANA, "7\n2\n1\n4\n4\n"].concat();
        let (output, session) = run(&script, &[]);

        assert!(output.contains(INVALID_OPTION));
        assert_eq!(balance_of(&session, 100, "001"), Some(dec!(501)));
    }

    #[test]
    fn invalid_input_in_account_resets_to_root() {
        // After the reset, "3" must be read as "report an issue", not "invest"
        let script = [OPEN_ANA, ENTER_ANA, "abc\n", "3\nbroken screen\n", "4\n"].concat();
        let (output, session) = run(&script, &[]);

        assert!(output.contains("Invalid input. Returning to main menu..."));
        assert!(output.contains("Thank you for your report! :)"));
        assert!(output.ends_with("Exiting...\n"));
        assert_eq!(balance_of(&session, 100, "001"), Some(dec!(500)));
    }

    #[test]
    fn invalid_amount_mid_operation_resets_to_root() {
        let script = [OPEN_ANA, ENTER_ANA, "2\nfifty\n", "4\n"].concat();
        let (output, session) = run(&script, &[]);

        assert!(output.contains("Invalid input. Returning to main menu..."));
        assert!(output.ends_with("Exiting...\n"));
        assert_eq!(balance_of(&session, 100, "001"), Some(dec!(500)));
    }

    #[test]
    fn invalid_balance_abandons_account_creation() {
        let (output, session) = run("1\n100\n001\nAna\nlots\n4\n", &[]);

        assert!(output.contains("Invalid input. Returning to main menu..."));
        assert!(!output.contains("Hello Ana"));
        assert!(session.store().is_empty());
    }

    #[test]
    fn invalid_root_option_resets_without_leaving() {
        let (output, _) = run("x\ny\n4\n", &[]);

        assert_eq!(output.matches("Returning to main menu").count(), 2);
        assert!(output.ends_with("Exiting...\n"));
    }

    #[test]
    fn recreating_an_account_overwrites_it() {
        let script = [OPEN_ANA, "1\n100\n001\nBia\n10\n", "4\n"].concat();
        let (_, session) = run(&script, &[]);

        assert_eq!(session.store().len(), 1);
        assert_eq!(balance_of(&session, 100, "001"), Some(dec!(10)));
    }

    #[test]
    fn same_number_on_another_branch_is_a_new_account() {
        let script = [OPEN_ANA, "1\n100\n002\nBia\n10\n", "4\n"].concat();
        let (_, session) = run(&script, &[]);

        assert_eq!(session.store().len(), 2);
        assert_eq!(balance_of(&session, 100, "001"), Some(dec!(500)));
        assert_eq!(balance_of(&session, 100, "002"), Some(dec!(10)));
    }

    #[test]
    fn negative_amounts_pass_through() {
        let script = [OPEN_ANA, ENTER_ANA, "1\n-100\n2\n-700\n4\n4\n"].concat();
        let (output, session) = run(&script, &[]);

        assert!(output.contains("Current balance: R$ 600.00"));
        assert!(output.contains("Current balance: R$ -100.00"));
        assert_eq!(balance_of(&session, 100, "001"), Some(dec!(-100)));
    }

    #[test_case("" ; "empty input")]
    #[test_case("1\n100\n" ; "mid creation")]
    #[test_case("1\n100\n001\nAna\n500\n2\n100\n001\n" ; "inside account")]
    fn end_of_input_ends_the_session(script: &str) {
        let mut session = session(script, &[]);
        assert!(session.run().is_ok());
    }
}

mod test_subscription_loss_resets_session;
